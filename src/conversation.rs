//! Conversation controller: the optimistic message log
//!
//! [`ConversationController`] owns the ordered, append-only list of
//! [`Message`]s and the advisory in-progress flag. A send appends in two
//! phases:
//!
//! 1. the user's message, synchronously, before any request is made;
//! 2. exactly one assistant message once the query resolves, whether it
//!    produced an answer or failed.
//!
//! Failures never escape [`ConversationController::send`]; they are turned
//! into assistant messages with a fixed display text. Each phase is a single
//! atomic update of a `tokio::sync::watch` channel, so overlapping sends can
//! interleave but never tear the log.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Number;
use tokio::sync::watch;

use crate::backend::validate::{
    parse_query_response, query_failure_message, Answer, QueryFailure, GENERIC_QUERY_ERROR_MESSAGE,
};
use crate::backend::{Backend, QueryRequest};
use crate::session::SessionController;

/// Status code the backend uses for a rejected or expired token
pub const DEFAULT_SESSION_EXPIRED_STATUS: u16 = 403;

/// One entry of the conversation log
///
/// `files` and `pages` only carry meaning on assistant messages, and only
/// when both are present with equal length. Use [`Message::citations`] to
/// read them; it applies that rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// `true` for the user's own messages
    pub is_user: bool,
    /// Message body: user input, an answer, or an error description
    pub text: String,
    /// Source files the answer drew on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<String>>,
    /// Page of each source file, index-aligned with `files`
    ///
    /// Kept as the JSON number the backend sent, so `3` and `3.5` both
    /// display unchanged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<Vec<Number>>,
    /// `true` when the text describes a failed query rather than an answer
    #[serde(skip)]
    pub is_error: bool,
}

impl Message {
    /// Creates a user message
    ///
    /// # Examples
    ///
    /// ```
    /// use citechat::conversation::Message;
    ///
    /// let msg = Message::user("hello");
    /// assert!(msg.is_user);
    /// assert_eq!(msg.text, "hello");
    /// ```
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            is_user: true,
            text: text.into(),
            files: None,
            pages: None,
            is_error: false,
        }
    }

    /// Creates an assistant message without citation context
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            is_user: false,
            text: text.into(),
            files: None,
            pages: None,
            is_error: false,
        }
    }

    /// Creates an assistant message reporting a failed query
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            is_error: true,
            ..Self::assistant(text)
        }
    }

    /// Creates an assistant message from a validated answer
    ///
    /// Citation lists that are missing, empty, or of unequal length are
    /// dropped together.
    pub fn from_answer(answer: Answer) -> Self {
        let (files, pages) = match (answer.files, answer.pages) {
            (Some(files), Some(pages)) if files.len() == pages.len() && !files.is_empty() => {
                (Some(files), Some(pages))
            }
            _ => (None, None),
        };
        Self {
            is_user: false,
            text: answer.text,
            files,
            pages,
            is_error: false,
        }
    }

    /// Citation context as `(file, page)` pairs
    ///
    /// Empty for user messages and whenever `files`/`pages` are not both
    /// present with equal length, even if the fields were set by hand.
    ///
    /// # Examples
    ///
    /// ```
    /// use citechat::conversation::Message;
    ///
    /// let mut msg = Message::assistant("x");
    /// msg.files = Some(vec!["a.pdf".to_string()]);
    /// msg.pages = Some(vec![3.into()]);
    /// assert_eq!(msg.citations()[0].to_string(), "File: a.pdf, Page: 3");
    ///
    /// msg.pages = Some(vec![3.into(), 4.into()]);
    /// assert!(msg.citations().is_empty());
    /// ```
    pub fn citations(&self) -> Vec<Citation> {
        if self.is_user {
            return Vec::new();
        }
        match (&self.files, &self.pages) {
            (Some(files), Some(pages)) if files.len() == pages.len() => files
                .iter()
                .zip(pages)
                .map(|(file, page)| Citation {
                    file: file.clone(),
                    page: page.clone(),
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// A single source reference: a file and the page the answer was found on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// Source file name
    pub file: String,
    /// Page within the file
    pub page: Number,
}

impl fmt::Display for Citation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "File: {}, Page: {}", self.file, self.page)
    }
}

/// Observable snapshot of a conversation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationState {
    /// Messages in the order they were appended
    pub messages: Vec<Message>,
    /// `true` while a send is waiting for its reply
    pub in_progress: bool,
}

/// Owner of the message log and the in-progress flag
///
/// The in-progress flag is advisory: the controller does not queue or
/// reject a send that starts while another is in flight. Callers that want
/// one query at a time gate on [`ConversationController::is_in_progress`].
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use citechat::backend::fake::FakeBackend;
/// use citechat::conversation::ConversationController;
/// use citechat::session::store::MemoryTokenStore;
/// use citechat::session::SessionController;
///
/// # #[tokio::main]
/// # async fn main() {
/// let backend = Arc::new(FakeBackend::new());
/// backend.push_answer(Ok(serde_json::json!({"files": [], "pages": [], "answer": "42"})));
///
/// let session = Arc::new(SessionController::new(
///     backend.clone(),
///     Box::new(MemoryTokenStore::with_token("abc")),
/// ));
/// session.restore();
///
/// let conversation = ConversationController::new(backend, session);
/// let reply = conversation.send("what is the answer?").await.unwrap();
/// assert_eq!(reply.text, "42");
/// assert_eq!(conversation.messages().len(), 2);
/// # }
/// ```
pub struct ConversationController {
    backend: Arc<dyn Backend>,
    session: Arc<SessionController>,
    session_expired_status: u16,
    state: watch::Sender<ConversationState>,
}

impl ConversationController {
    /// Creates an empty conversation that queries with `session`'s token
    pub fn new(backend: Arc<dyn Backend>, session: Arc<SessionController>) -> Self {
        let (state, _) = watch::channel(ConversationState::default());
        Self {
            backend,
            session,
            session_expired_status: DEFAULT_SESSION_EXPIRED_STATUS,
            state,
        }
    }

    /// Overrides the status code treated as an expired session
    pub fn with_session_expired_status(mut self, status: u16) -> Self {
        self.session_expired_status = status;
        self
    }

    /// Sends `text` as a query and appends the exchange to the log
    ///
    /// Blank input is ignored and returns `None`. Otherwise the user message
    /// is appended immediately, the query runs, and exactly one assistant
    /// message is appended and returned. Failed queries produce a reply with
    /// [`Message::is_error`] set. If the returned future is dropped early, a
    /// generic error reply is appended in its place and the in-progress flag
    /// is still cleared.
    pub async fn send(&self, text: &str) -> Option<Message> {
        if text.trim().is_empty() {
            return None;
        }

        self.state.send_modify(|state| {
            state.in_progress = true;
            state.messages.push(Message::user(text));
        });
        let guard = InProgressGuard::new(&self.state);

        let reply = match self.query(text).await {
            Ok(answer) => Message::from_answer(answer),
            Err(failure) => {
                match &failure {
                    QueryFailure::MissingToken => tracing::warn!("Query attempted without a session token"),
                    QueryFailure::Backend(e) => tracing::error!("Query failed: {}", e),
                    QueryFailure::Invalid(e) => tracing::error!("Query returned an invalid body: {}", e),
                }
                Message::error(query_failure_message(
                    &failure,
                    self.session_expired_status,
                ))
            }
        };

        guard.complete(reply.clone());
        Some(reply)
    }

    async fn query(&self, text: &str) -> Result<Answer, QueryFailure> {
        let token = self
            .session
            .current_token()
            .ok_or(QueryFailure::MissingToken)?;

        let request = QueryRequest {
            query: text.to_string(),
        };
        tracing::debug!("Sending query ({} chars)", request.query.len());

        let body = self
            .backend
            .get_answer(&request, &token)
            .await
            .map_err(QueryFailure::Backend)?;

        parse_query_response(&body).map_err(QueryFailure::Invalid)
    }

    /// Empties the log and clears the in-progress flag
    ///
    /// A send already in flight still appends its reply when it resolves.
    pub fn reset(&self) {
        self.state.send_modify(|state| *state = ConversationState::default());
        tracing::debug!("Conversation reset");
    }

    /// Snapshot of the whole conversation state
    pub fn state(&self) -> ConversationState {
        self.state.borrow().clone()
    }

    /// Snapshot of the message log
    pub fn messages(&self) -> Vec<Message> {
        self.state.borrow().messages.clone()
    }

    /// Returns `true` while a send is waiting for its reply
    pub fn is_in_progress(&self) -> bool {
        self.state.borrow().in_progress
    }

    /// Receiver that observes every state change
    pub fn subscribe(&self) -> watch::Receiver<ConversationState> {
        self.state.subscribe()
    }
}

impl fmt::Debug for ConversationController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("ConversationController")
            .field("messages", &state.messages.len())
            .field("in_progress", &state.in_progress)
            .finish_non_exhaustive()
    }
}

/// Finishes a send that ends without completing
///
/// A dropped send still gets its one assistant reply, a generic error, so
/// no user message is left unanswered.
struct InProgressGuard<'a> {
    state: &'a watch::Sender<ConversationState>,
    armed: bool,
}

impl<'a> InProgressGuard<'a> {
    fn new(state: &'a watch::Sender<ConversationState>) -> Self {
        Self { state, armed: true }
    }

    /// Appends the reply and clears the flag in one update
    fn complete(mut self, reply: Message) {
        self.state.send_modify(|state| {
            state.messages.push(reply);
            state.in_progress = false;
        });
        self.armed = false;
    }
}

impl Drop for InProgressGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            tracing::warn!("Query abandoned before a reply arrived");
            self.state.send_modify(|state| {
                state.messages.push(Message::error(GENERIC_QUERY_ERROR_MESSAGE));
                state.in_progress = false;
            });
        }
    }
}
