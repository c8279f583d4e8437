//! Configuration management for Citechat
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{CitechatError, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/citechat.yaml";

/// Main configuration structure for Citechat
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backend server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Session token persistence settings
    #[serde(default)]
    pub session: SessionConfig,

    /// Interactive chat settings
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Backend server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL that `login` and `get-answer` are resolved against
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout (seconds)
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Status code the backend uses for a rejected or expired token
    #[serde(default = "default_session_expired_status")]
    pub session_expired_status: u16,
}

fn default_base_url() -> String {
    "http://localhost:8000/".to_string()
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_session_expired_status() -> u16 {
    403
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
            session_expired_status: default_session_expired_status(),
        }
    }
}

/// Where the session token is persisted
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TokenStoreKind {
    /// A file inside the session directory
    #[default]
    File,
    /// The operating system keyring
    Keyring,
    /// Process memory only; nothing survives the process
    Memory,
}

impl std::str::FromStr for TokenStoreKind {
    type Err = CitechatError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "file" => Ok(TokenStoreKind::File),
            "keyring" => Ok(TokenStoreKind::Keyring),
            "memory" => Ok(TokenStoreKind::Memory),
            other => Err(CitechatError::Config(format!(
                "Invalid session store: {}. Must be one of: file, keyring, memory",
                other
            ))),
        }
    }
}

/// Session token persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Token store backend
    #[serde(default)]
    pub store: TokenStoreKind,

    /// Directory for the file store; resolved per user when unset
    #[serde(default)]
    pub dir: Option<PathBuf>,

    /// Fixed key the token is stored under
    #[serde(default = "default_session_key")]
    pub key: String,
}

fn default_session_key() -> String {
    "token".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            store: TokenStoreKind::default(),
            dir: None,
            key: default_session_key(),
        }
    }
}

/// Interactive chat configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Print the `Context:` block for answers that cite sources
    #[serde(default = "default_show_citations")]
    pub show_citations: bool,

    /// Prompt shown by the REPL
    #[serde(default = "default_prompt")]
    pub prompt: String,
}

fn default_show_citations() -> bool {
    true
}

fn default_prompt() -> String {
    ">> ".to_string()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            show_citations: default_show_citations(),
            prompt: default_prompt(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// A missing file is not an error; defaults are used instead.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::debug!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| CitechatError::Config(format!("Failed to read config file: {}", e)))?;
        let config = serde_yaml::from_str(&contents)
            .map_err(CitechatError::Yaml)
            .with_context(|| format!("Failed to parse config file {}", path))?;
        Ok(config)
    }

    fn apply_env_vars(&mut self) {
        if let Ok(base_url) = std::env::var("CITECHAT_BASE_URL") {
            tracing::debug!(base_url = %base_url, "Env override: CITECHAT_BASE_URL");
            self.server.base_url = base_url;
        }

        if let Ok(timeout) = std::env::var("CITECHAT_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.server.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid CITECHAT_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(store) = std::env::var("CITECHAT_SESSION_STORE") {
            match store.parse() {
                Ok(kind) => self.session.store = kind,
                Err(e) => tracing::warn!("{}", e),
            }
        }

        if let Ok(dir) = std::env::var("CITECHAT_SESSION_DIR") {
            self.session.dir = Some(PathBuf::from(dir));
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(base_url) = &cli.base_url {
            self.server.base_url = base_url.clone();
        }
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns error if configuration is invalid
    pub fn validate(&self) -> Result<()> {
        let parsed = url::Url::parse(&self.server.base_url).map_err(|e| {
            CitechatError::Config(format!(
                "Invalid server.base_url '{}': {}",
                self.server.base_url, e
            ))
        })?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(CitechatError::Config(format!(
                "server.base_url must use http or https, got '{}'",
                parsed.scheme()
            ))
            .into());
        }

        if self.server.timeout_seconds == 0 {
            return Err(CitechatError::Config(
                "server.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if !(400..=599).contains(&self.server.session_expired_status) {
            return Err(CitechatError::Config(format!(
                "server.session_expired_status must be an error status (400-599), got {}",
                self.server.session_expired_status
            ))
            .into());
        }

        if self.session.key.trim().is_empty() {
            return Err(
                CitechatError::Config("session.key cannot be empty".to_string()).into(),
            );
        }

        Ok(())
    }
}
