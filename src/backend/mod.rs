//! Backend abstraction and implementations
//!
//! This module provides the [`Backend`] trait, the reqwest-backed
//! [`HttpBackend`], a scripted [`fake::FakeBackend`] for tests, and the
//! response validation shared by the controllers.

pub mod base;
pub mod fake;
pub mod http;
pub mod validate;

pub use base::{Backend, LoginRequest, QueryRequest, GET_ANSWER_PATH, LOGIN_PATH};
pub use http::HttpBackend;
pub use validate::{Answer, QueryFailure};

use crate::config::ServerConfig;
use crate::error::Result;
use std::sync::Arc;

/// Create the backend described by the server configuration
///
/// # Errors
///
/// Returns error if the HTTP backend cannot be built
///
/// # Examples
///
/// ```
/// use citechat::backend::create_backend;
/// use citechat::config::ServerConfig;
///
/// let backend = create_backend(&ServerConfig::default());
/// assert!(backend.is_ok());
/// ```
pub fn create_backend(config: &ServerConfig) -> Result<Arc<dyn Backend>> {
    Ok(Arc::new(HttpBackend::new(config)?))
}
