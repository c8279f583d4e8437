//! Citechat - document question answering from the terminal
//!
#![doc = "Citechat - document question answering from the terminal"]
#![doc = "Main entry point for the citechat client."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use citechat::cli::{Cli, Commands};
use citechat::commands;
use citechat::config::{Config, DEFAULT_CONFIG_PATH};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Login { username, password } => {
            tracing::info!("Starting login");
            commands::auth::run_login(&config, username, password).await?;
            Ok(())
        }
        Commands::Logout => {
            tracing::info!("Starting logout");
            commands::auth::run_logout(&config)?;
            Ok(())
        }
        Commands::Ask { query, json } => {
            tracing::info!("Starting one-shot query");
            if json {
                tracing::debug!("Printing reply as JSON");
            }
            commands::ask::run_ask(&config, query, json).await?;
            Ok(())
        }
        Commands::Chat => {
            commands::chat::run_chat(&config).await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so they never mix with answers on stdout.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "citechat=debug" } else { "citechat=warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
