//! Base backend trait and wire types for Citechat
//!
//! This module defines the [`Backend`] trait that all question-answering
//! backends implement, along with the request bodies sent over the wire.
//!
//! Backends return raw JSON bodies. Deciding whether a body has the right
//! shape is the job of [`crate::backend::validate`], so every backend gets
//! the same strict checks regardless of transport.

use crate::error::BackendError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Path of the authentication endpoint, relative to the base URL
pub const LOGIN_PATH: &str = "login";

/// Path of the query endpoint, relative to the base URL
pub const GET_ANSWER_PATH: &str = "get-answer";

/// Body of a login request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Username as entered
    pub username: String,
    /// Password as entered
    pub password: String,
}

/// Body of a query request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Question text
    pub query: String,
}

/// Remote question-answering service
///
/// Implementations perform exactly one request per call and never retry.
/// A non-success status must be reported as [`BackendError::Status`] so the
/// controllers can tell an expired session apart from other failures.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use citechat::backend::{Backend, LoginRequest, QueryRequest};
/// use citechat::error::BackendError;
///
/// struct EchoBackend;
///
/// #[async_trait]
/// impl Backend for EchoBackend {
///     async fn login(&self, _request: &LoginRequest) -> Result<serde_json::Value, BackendError> {
///         Ok(serde_json::json!({"token": "echo"}))
///     }
///
///     async fn get_answer(
///         &self,
///         request: &QueryRequest,
///         _token: &str,
///     ) -> Result<serde_json::Value, BackendError> {
///         Ok(serde_json::json!({"files": [], "pages": [], "answer": request.query}))
///     }
/// }
/// ```
#[async_trait]
pub trait Backend: Send + Sync {
    /// Exchanges credentials for a session token
    ///
    /// # Returns
    ///
    /// Returns the raw success body, expected to be `{"token": "..."}`
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when no success response was obtained
    async fn login(&self, request: &LoginRequest) -> Result<serde_json::Value, BackendError>;

    /// Asks a question on behalf of the session identified by `token`
    ///
    /// # Returns
    ///
    /// Returns the raw success body, expected to be
    /// `{"files": [...], "pages": [...], "answer": "..."}`
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when no success response was obtained
    async fn get_answer(
        &self,
        request: &QueryRequest,
        token: &str,
    ) -> Result<serde_json::Value, BackendError>;
}
