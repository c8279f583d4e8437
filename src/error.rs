//! Error types for Citechat
//!
//! This module defines the error types used throughout the client,
//! using `thiserror` for ergonomic error handling.
//!
//! Two families exist:
//!
//! - [`CitechatError`]: plumbing failures (configuration, token storage,
//!   I/O, serialization) propagated with `?` through [`Result`].
//! - [`BackendError`]: failures reported by a [`crate::backend::Backend`].
//!   The controllers never propagate these; they map them to login outcomes
//!   or assistant messages.

use thiserror::Error;

/// Main error type for Citechat plumbing
#[derive(Error, Debug)]
pub enum CitechatError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Token storage errors (session directory, file permissions)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Response body did not match the expected shape
    #[error("Invalid response body: {0}")]
    InvalidResponse(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP client construction errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Keyring/credential storage errors
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

/// Failure reported by a backend call
///
/// Mirrors the three shapes a remote call can fail with: the server answered
/// with a non-success status (optionally carrying a `detail` message), the
/// request never produced a response, or the response body could not be read.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The server answered with a non-success status code
    #[error("Server returned status {status}{}", format_detail(.detail))]
    Status {
        /// HTTP status code
        status: u16,
        /// `detail` field of the error body, when the body carried one
        detail: Option<String>,
    },

    /// The request failed before a response was received
    #[error("Request failed: {0}")]
    Network(String),

    /// A success response whose body was not JSON
    #[error("Unreadable response body: {0}")]
    InvalidBody(String),
}

impl BackendError {
    /// Returns the HTTP status for [`BackendError::Status`] errors
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` when the failure happened at the transport level
    ///
    /// Both status errors and network errors count; an unreadable body on a
    /// success response does not.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            BackendError::Status { .. } | BackendError::Network(_)
        )
    }
}

fn format_detail(detail: &Option<String>) -> String {
    match detail {
        Some(d) => format!(": {}", d),
        None => String::new(),
    }
}

/// Result type alias for Citechat operations
///
/// Uses `anyhow::Error` so plumbing code can attach context while still
/// carrying [`CitechatError`] values underneath.
pub type Result<T> = anyhow::Result<T>;
