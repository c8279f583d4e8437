//! Command-line interface definition for Citechat
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for logging in and out, one-shot questions,
//! and the interactive chat loop.

use clap::{Parser, Subcommand};

/// Citechat - ask questions about your documents from the terminal
///
/// Answers come back with the files and pages they were drawn from.
#[derive(Parser, Debug, Clone)]
#[command(name = "citechat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = crate::config::DEFAULT_CONFIG_PATH)]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the backend base URL from config
    #[arg(long)]
    pub base_url: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Citechat
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Log in and store the session token
    Login {
        /// Username (prompted when omitted)
        #[arg(short, long)]
        username: Option<String>,

        /// Password (prompted when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Forget the stored session token
    Logout,

    /// Ask a single question using the stored session
    Ask {
        /// Question text; multiple words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Print the answer as JSON
        #[arg(long)]
        json: bool,
    },

    /// Start the interactive chat loop
    Chat,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
