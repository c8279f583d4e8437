//! In-process fake backend for unit and integration tests
//!
//! [`FakeBackend`] replaces real HTTP calls with scripted responses and
//! records every request it receives, so tests can assert both on what the
//! controllers did and on whether a network call happened at all.
//!
//! # Example
//!
//! ```
//! use citechat::backend::fake::FakeBackend;
//! use citechat::backend::{Backend, LoginRequest};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let backend = FakeBackend::new();
//! backend.push_login(Ok(serde_json::json!({"token": "abc"})));
//!
//! let request = LoginRequest {
//!     username: "alice".to_string(),
//!     password: "secret".to_string(),
//! };
//! let body = backend.login(&request).await.unwrap();
//! assert_eq!(body["token"], "abc");
//! assert_eq!(backend.login_calls(), vec![request]);
//! # }
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use crate::backend::base::{Backend, LoginRequest, QueryRequest};
use crate::error::BackendError;

type Scripted = (Option<Duration>, Result<serde_json::Value, BackendError>);

#[derive(Debug, Default)]
struct FakeState {
    login_responses: VecDeque<Scripted>,
    answer_responses: VecDeque<Scripted>,
    login_calls: Vec<LoginRequest>,
    answer_calls: Vec<(QueryRequest, String)>,
}

/// Scripted backend; clones share the same script and call log
///
/// When a script runs dry the call fails with [`BackendError::Network`].
#[derive(Debug, Clone, Default)]
pub struct FakeBackend {
    state: Arc<Mutex<FakeState>>,
}

impl FakeBackend {
    /// Creates a fake with empty scripts
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Queues the result of the next `login` call
    pub fn push_login(&self, response: Result<serde_json::Value, BackendError>) {
        self.lock().login_responses.push_back((None, response));
    }

    /// Queues the result of the next `get_answer` call
    pub fn push_answer(&self, response: Result<serde_json::Value, BackendError>) {
        self.lock().answer_responses.push_back((None, response));
    }

    /// Queues a `get_answer` result that resolves only after `delay`
    pub fn push_answer_after(
        &self,
        delay: Duration,
        response: Result<serde_json::Value, BackendError>,
    ) {
        self.lock().answer_responses.push_back((Some(delay), response));
    }

    /// Login requests received so far
    pub fn login_calls(&self) -> Vec<LoginRequest> {
        self.lock().login_calls.clone()
    }

    /// Query requests received so far, with the bearer token used
    pub fn answer_calls(&self) -> Vec<(QueryRequest, String)> {
        self.lock().answer_calls.clone()
    }

    /// Total number of requests of any kind
    pub fn call_count(&self) -> usize {
        let state = self.lock();
        state.login_calls.len() + state.answer_calls.len()
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn login(&self, request: &LoginRequest) -> Result<serde_json::Value, BackendError> {
        let scripted = {
            let mut state = self.lock();
            state.login_calls.push(request.clone());
            state.login_responses.pop_front()
        };
        resolve(scripted, "login").await
    }

    async fn get_answer(
        &self,
        request: &QueryRequest,
        token: &str,
    ) -> Result<serde_json::Value, BackendError> {
        let scripted = {
            let mut state = self.lock();
            state
                .answer_calls
                .push((request.clone(), token.to_string()));
            state.answer_responses.pop_front()
        };
        resolve(scripted, "get-answer").await
    }
}

async fn resolve(
    scripted: Option<Scripted>,
    endpoint: &str,
) -> Result<serde_json::Value, BackendError> {
    match scripted {
        Some((delay, response)) => {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            response
        }
        None => Err(BackendError::Network(format!(
            "no scripted response for {}",
            endpoint
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unscripted_call_fails_with_network_error() {
        let backend = FakeBackend::new();
        let request = QueryRequest {
            query: "hi".to_string(),
        };
        let err = backend.get_answer(&request, "tok").await.unwrap_err();
        assert!(matches!(err, BackendError::Network(_)));
        assert_eq!(backend.answer_calls(), vec![(request, "tok".to_string())]);
    }

    #[tokio::test]
    async fn test_responses_are_served_in_order() {
        let backend = FakeBackend::new();
        backend.push_answer(Ok(serde_json::json!({"n": 1})));
        backend.push_answer(Err(BackendError::Status {
            status: 500,
            detail: None,
        }));

        let request = QueryRequest {
            query: "q".to_string(),
        };
        assert_eq!(
            backend.get_answer(&request, "t").await.unwrap(),
            serde_json::json!({"n": 1})
        );
        assert!(backend.get_answer(&request, "t").await.is_err());
        assert_eq!(backend.call_count(), 2);
    }

    #[tokio::test]
    async fn test_clones_share_script() {
        let backend = FakeBackend::new();
        let clone = backend.clone();
        clone.push_login(Ok(serde_json::json!({"token": "shared"})));

        let request = LoginRequest {
            username: "u".to_string(),
            password: "p".to_string(),
        };
        assert!(backend.login(&request).await.is_ok());
        assert_eq!(clone.login_calls().len(), 1);
    }
}
