//! Response validation and error-to-message mapping
//!
//! Every body returned by a [`crate::backend::Backend`] passes through an
//! explicit structural check here before the controllers accept it. Nothing
//! is deserialized optimistically: field presence, element types and the
//! cross-field length of `files`/`pages` are all checked on the raw
//! `serde_json::Value`.
//!
//! The display strings shown to the user for every failure kind also live
//! here, so the session and conversation controllers agree on wording.

use crate::error::{BackendError, CitechatError};
use serde_json::{Number, Value};

/// Shown when login is attempted with a blank username
pub const USERNAME_EMPTY_MESSAGE: &str = "Username field cannot be empty";

/// Shown when login is attempted with a blank password
pub const PASSWORD_EMPTY_MESSAGE: &str = "Password field cannot be empty";

/// Login failed at the transport level without a server-supplied detail
pub const UNKNOWN_TRANSPORT_MESSAGE: &str = "Unknown transport error";

/// Login failed for a reason that is not a transport error
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error, check logs for more details";

/// A query was attempted while logged out
pub const TOKEN_NOT_DEFINED_MESSAGE: &str = "Error: Token not defined";

/// The backend rejected the session token on a query
pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired, please log in again";

/// Any other query failure
pub const GENERIC_QUERY_ERROR_MESSAGE: &str = "Error: Check logs for more details";

/// A validated answer from the query endpoint
///
/// `files` and `pages` are either both `Some` with equal, non-zero length,
/// or both `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    /// Source files, index-aligned with `pages`
    pub files: Option<Vec<String>>,
    /// Page numbers, index-aligned with `files`
    pub pages: Option<Vec<Number>>,
    /// Answer text
    pub text: String,
}

/// Why a query did not produce an answer
#[derive(Debug)]
pub enum QueryFailure {
    /// No session token was available; no request was made
    MissingToken,
    /// The backend call itself failed
    Backend(BackendError),
    /// The backend answered but the body had the wrong shape
    Invalid(CitechatError),
}

/// Checks a login success body and extracts the token
///
/// The body must be an object whose `token` field is a string.
///
/// # Errors
///
/// Returns [`CitechatError::InvalidResponse`] for any other shape
///
/// # Examples
///
/// ```
/// use citechat::backend::validate::parse_login_response;
///
/// let token = parse_login_response(&serde_json::json!({"token": "abc"})).unwrap();
/// assert_eq!(token, "abc");
/// assert!(parse_login_response(&serde_json::json!({})).is_err());
/// ```
pub fn parse_login_response(body: &Value) -> Result<String, CitechatError> {
    body.get("token")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| CitechatError::InvalidResponse("expected a string 'token' field".into()))
}

/// Checks a query success body and normalizes it into an [`Answer`]
///
/// Accepted only when `files` is an array of strings, `pages` is an array of
/// numbers of the same length, and `answer` is a string. An empty `files`
/// array yields an answer with no citation context at all.
///
/// # Errors
///
/// Returns [`CitechatError::InvalidResponse`] naming the first check that
/// failed
///
/// # Examples
///
/// ```
/// use citechat::backend::validate::parse_query_response;
///
/// let body = serde_json::json!({"files": ["a.pdf"], "pages": [3], "answer": "x"});
/// let answer = parse_query_response(&body).unwrap();
/// assert_eq!(answer.files, Some(vec!["a.pdf".to_string()]));
/// assert_eq!(answer.pages, Some(vec![3.into()]));
/// assert_eq!(answer.text, "x");
/// ```
pub fn parse_query_response(body: &Value) -> Result<Answer, CitechatError> {
    let files = body
        .get("files")
        .and_then(Value::as_array)
        .ok_or_else(|| invalid("expected a 'files' array"))?
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect::<Option<Vec<String>>>()
        .ok_or_else(|| invalid("'files' must contain only strings"))?;

    let pages = body
        .get("pages")
        .and_then(Value::as_array)
        .ok_or_else(|| invalid("expected a 'pages' array"))?
        .iter()
        .map(|item| item.as_number().cloned())
        .collect::<Option<Vec<Number>>>()
        .ok_or_else(|| invalid("'pages' must contain only numbers"))?;

    if files.len() != pages.len() {
        return Err(invalid(&format!(
            "'files' has {} entries but 'pages' has {}",
            files.len(),
            pages.len()
        )));
    }

    let text = body
        .get("answer")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid("expected a string 'answer' field"))?
        .to_string();

    if files.is_empty() {
        return Ok(Answer {
            files: None,
            pages: None,
            text,
        });
    }

    Ok(Answer {
        files: Some(files),
        pages: Some(pages),
        text,
    })
}

/// Display message for a failed login call
///
/// Prefers the server's `detail`, then a generic transport message, then a
/// generic unknown-error message.
pub fn login_failure_message(error: &BackendError) -> String {
    match error {
        BackendError::Status {
            detail: Some(detail),
            ..
        } => detail.clone(),
        error if error.is_transport() => UNKNOWN_TRANSPORT_MESSAGE.to_string(),
        _ => UNKNOWN_ERROR_MESSAGE.to_string(),
    }
}

/// Assistant text for a failed query
///
/// # Arguments
///
/// * `failure` - What went wrong
/// * `session_expired_status` - Status the backend uses for a rejected token
///
/// # Examples
///
/// ```
/// use citechat::backend::validate::{query_failure_message, QueryFailure};
/// use citechat::error::BackendError;
///
/// let expired = QueryFailure::Backend(BackendError::Status { status: 403, detail: None });
/// assert_eq!(
///     query_failure_message(&expired, 403),
///     "Session expired, please log in again"
/// );
/// ```
pub fn query_failure_message(failure: &QueryFailure, session_expired_status: u16) -> &'static str {
    match failure {
        QueryFailure::MissingToken => TOKEN_NOT_DEFINED_MESSAGE,
        QueryFailure::Backend(error) if error.status() == Some(session_expired_status) => {
            SESSION_EXPIRED_MESSAGE
        }
        QueryFailure::Backend(_) | QueryFailure::Invalid(_) => GENERIC_QUERY_ERROR_MESSAGE,
    }
}

fn invalid(reason: &str) -> CitechatError {
    CitechatError::InvalidResponse(reason.to_string())
}
