//! HTTP backend implementation
//!
//! Talks to the question-answering service over HTTP using `reqwest`:
//!
//! - `POST {base}/login` with `{username, password}`
//! - `POST {base}/get-answer` with `{query}` and `Authorization: Bearer {token}`
//!
//! Non-success responses are reported as [`BackendError::Status`], carrying
//! the `detail` string of a JSON error body when the server supplied one.

use crate::backend::base::{Backend, LoginRequest, QueryRequest, GET_ANSWER_PATH, LOGIN_PATH};
use crate::config::ServerConfig;
use crate::error::{BackendError, CitechatError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use url::Url;

/// Backend that issues real HTTP requests
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    /// Create a new HTTP backend
    ///
    /// # Arguments
    ///
    /// * `config` - Server configuration (base URL and timeout)
    ///
    /// # Errors
    ///
    /// Returns error if the base URL does not parse or the HTTP client
    /// cannot be built
    ///
    /// # Examples
    ///
    /// ```
    /// use citechat::backend::HttpBackend;
    /// use citechat::config::ServerConfig;
    ///
    /// let backend = HttpBackend::new(&ServerConfig::default());
    /// assert!(backend.is_ok());
    /// ```
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("citechat/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(CitechatError::Http)?;

        let base_url = normalize_base_url(&config.base_url)?;

        tracing::info!("Initialized HTTP backend: base_url={}", base_url);

        Ok(Self { client, base_url })
    }

    /// Base URL every endpoint is resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> std::result::Result<Url, BackendError> {
        self.base_url
            .join(path)
            .map_err(|e| BackendError::Network(format!("Invalid endpoint URL for {}: {}", path, e)))
    }

    async fn post_json<B: Serialize + ?Sized + Sync>(
        &self,
        path: &str,
        body: &B,
        token: Option<&str>,
    ) -> std::result::Result<serde_json::Value, BackendError> {
        let url = self.endpoint(path)?;
        tracing::debug!("POST {}", url);

        let mut request = self.client.post(url).json(body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!("Request to {} failed: {}", path, e);
            BackendError::Network(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Backend returned error {} for {}", status, path);
            return Err(BackendError::Status {
                status: status.as_u16(),
                detail: extract_detail(&error_text),
            });
        }

        let text = response.text().await.map_err(|e| {
            tracing::error!("Failed to read response body from {}: {}", path, e);
            BackendError::Network(e.to_string())
        })?;

        serde_json::from_str(&text).map_err(|e| {
            tracing::error!("Response from {} is not JSON: {}", path, e);
            BackendError::InvalidBody(e.to_string())
        })
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn login(&self, request: &LoginRequest) -> std::result::Result<serde_json::Value, BackendError> {
        self.post_json(LOGIN_PATH, request, None).await
    }

    async fn get_answer(
        &self,
        request: &QueryRequest,
        token: &str,
    ) -> std::result::Result<serde_json::Value, BackendError> {
        self.post_json(GET_ANSWER_PATH, request, Some(token)).await
    }
}

/// Parses the base URL and guarantees a trailing slash
///
/// `Url::join` replaces the last path segment unless the base ends with `/`,
/// so `https://host/api` must become `https://host/api/` for `login` to
/// resolve to `https://host/api/login`.
fn normalize_base_url(raw: &str) -> Result<Url> {
    let mut base = raw.trim().to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    Url::parse(&base)
        .map_err(|e| CitechatError::Config(format!("Invalid base URL '{}': {}", raw, e)).into())
}

/// Pulls a string `detail` field out of an error body, if there is one
fn extract_detail(body: &str) -> Option<String> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()?
        .get("detail")?
        .as_str()
        .map(str::to_string)
}
