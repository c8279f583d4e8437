//! Session controller: token lifecycle
//!
//! [`SessionController`] owns the single optional session token. It restores
//! the token from a [`TokenStore`] at startup, acquires a new one through
//! [`SessionController::login`], and drops it on [`SessionController::logout`].
//!
//! The current token is published on a `tokio::sync::watch` channel so a
//! presentation layer can react to login and logout without polling.
//!
//! None of the operations return errors. Login failures become a
//! [`LoginOutcome`]; storage failures are logged and otherwise ignored, so a
//! broken store degrades to a session that lasts only as long as the process.

pub mod store;

use std::sync::Arc;

use tokio::sync::watch;

use crate::backend::validate::{
    login_failure_message, parse_login_response, PASSWORD_EMPTY_MESSAGE, UNKNOWN_ERROR_MESSAGE,
    USERNAME_EMPTY_MESSAGE,
};
use crate::backend::{Backend, LoginRequest};
use store::TokenStore;

/// Result of a login attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Credentials accepted; the token is now current and persisted
    Success {
        /// The session token returned by the backend
        token: String,
    },
    /// A field was blank; no request was made
    FieldValidation {
        /// Which field was blank, as a display message
        message: String,
    },
    /// The backend call failed or returned an unusable body
    Failure {
        /// Display message for the user
        message: String,
    },
}

impl LoginOutcome {
    /// Returns `true` for [`LoginOutcome::Success`]
    pub fn is_success(&self) -> bool {
        matches!(self, LoginOutcome::Success { .. })
    }

    /// The token, for successful outcomes
    pub fn token(&self) -> Option<&str> {
        match self {
            LoginOutcome::Success { token } => Some(token.as_str()),
            _ => None,
        }
    }

    /// The message to show the user; `None` on success
    pub fn display_message(&self) -> Option<&str> {
        match self {
            LoginOutcome::Success { .. } => None,
            LoginOutcome::FieldValidation { message } | LoginOutcome::Failure { message } => {
                Some(message.as_str())
            }
        }
    }
}

/// Owner of the current session token
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use citechat::backend::fake::FakeBackend;
/// use citechat::session::store::MemoryTokenStore;
/// use citechat::session::SessionController;
///
/// # #[tokio::main]
/// # async fn main() {
/// let backend = FakeBackend::new();
/// backend.push_login(Ok(serde_json::json!({"token": "abc"})));
///
/// let session = SessionController::new(Arc::new(backend), Box::new(MemoryTokenStore::new()));
/// let outcome = session.login("alice", "secret").await;
/// assert!(outcome.is_success());
/// assert_eq!(session.current_token().as_deref(), Some("abc"));
///
/// session.logout();
/// assert!(!session.is_logged_in());
/// # }
/// ```
pub struct SessionController {
    backend: Arc<dyn Backend>,
    store: Box<dyn TokenStore>,
    token: watch::Sender<Option<String>>,
}

impl SessionController {
    /// Creates a logged-out controller
    ///
    /// Call [`SessionController::restore`] to adopt a previously stored token.
    pub fn new(backend: Arc<dyn Backend>, store: Box<dyn TokenStore>) -> Self {
        let (token, _) = watch::channel(None);
        Self {
            backend,
            store,
            token,
        }
    }

    /// Adopts the stored token, if there is one
    ///
    /// Idempotent and offline. A missing token or an unreadable store leaves
    /// the current state untouched.
    pub fn restore(&self) {
        match self.store.load() {
            Ok(Some(token)) => {
                tracing::info!("Restored session token from storage");
                self.token.send_replace(Some(token));
            }
            Ok(None) => tracing::debug!("No stored session token"),
            Err(e) => tracing::warn!("Failed to read stored session token: {}", e),
        }
    }

    /// Exchanges credentials for a session token
    ///
    /// Blank fields (after trimming) are rejected locally, username first.
    /// Otherwise exactly one backend request is made and the credentials are
    /// sent as entered.
    pub async fn login(&self, username: &str, password: &str) -> LoginOutcome {
        if username.trim().is_empty() {
            return LoginOutcome::FieldValidation {
                message: USERNAME_EMPTY_MESSAGE.to_string(),
            };
        }
        if password.trim().is_empty() {
            return LoginOutcome::FieldValidation {
                message: PASSWORD_EMPTY_MESSAGE.to_string(),
            };
        }

        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };

        tracing::debug!("Sending login request");
        let body = match self.backend.login(&request).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Login failed: {}", e);
                return LoginOutcome::Failure {
                    message: login_failure_message(&e),
                };
            }
        };

        let token = match parse_login_response(&body) {
            Ok(token) => token,
            Err(e) => {
                tracing::error!("Login returned a malformed body: {}", e);
                return LoginOutcome::Failure {
                    message: UNKNOWN_ERROR_MESSAGE.to_string(),
                };
            }
        };

        if let Err(e) = self.store.save(&token) {
            tracing::warn!("Failed to persist session token: {}", e);
        }
        self.token.send_replace(Some(token.clone()));
        tracing::info!("Logged in");

        LoginOutcome::Success { token }
    }

    /// Drops the current token from memory and storage
    ///
    /// Always succeeds and never touches the network.
    pub fn logout(&self) {
        if let Err(e) = self.store.clear() {
            tracing::warn!("Failed to clear stored session token: {}", e);
        }
        self.token.send_replace(None);
        tracing::info!("Logged out");
    }

    /// The current token, if logged in
    pub fn current_token(&self) -> Option<String> {
        self.token.borrow().clone()
    }

    /// Returns `true` when a token is current
    pub fn is_logged_in(&self) -> bool {
        self.token.borrow().is_some()
    }

    /// Receiver that observes every token change
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.token.subscribe()
    }
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("logged_in", &self.is_logged_in())
            .finish_non_exhaustive()
    }
}
