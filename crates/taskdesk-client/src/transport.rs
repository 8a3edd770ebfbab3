//! HTTP transport.
//!
//! Every request carries `Content-Type: application/json` and
//! `Accept: application/json`, plus `Authorization: Bearer <token>` when the
//! token store holds one. Requests time out after the configured duration.
//!
//! A 401 response clears the stored token and broadcasts one
//! [`AuthEvent::LoginRequired`]; the caller still receives the original
//! [`ApiError`]. Nothing is retried and no other error is rewritten.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use taskdesk_auth::TokenStore;
use taskdesk_settings::ApiSettings;

use crate::errors::ApiError;

/// Capacity of the auth event channel.
const AUTH_EVENT_CAPACITY: usize = 16;

/// Transport configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportConfig {
    /// Base URL that request paths are appended to.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl TransportConfig {
    /// Config with the default 5 second timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(5),
        }
    }

    /// Override the timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build from the `api` settings section.
    pub fn from_settings(settings: &ApiSettings) -> Self {
        Self::new(settings.base_url.clone()).with_timeout(settings.timeout())
    }
}

/// Signals the transport raises besides returning errors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthEvent {
    /// The backend rejected the token; the stored token has been cleared and
    /// the user must log in again.
    LoginRequired {
        /// Method of the rejected request.
        method: String,
        /// Path of the rejected request.
        path: String,
    },
}

/// Configured HTTP client shared by all gateway calls.
pub struct Transport {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    tokens: Arc<dyn TokenStore>,
    auth_events: broadcast::Sender<AuthEvent>,
}

impl Transport {
    /// Build a transport.
    pub fn new(config: TransportConfig, tokens: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        let _ = headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let _ = headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::InvalidRequest {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        let (auth_events, _) = broadcast::channel(AUTH_EVENT_CAPACITY);
        let base_url = config.base_url.trim_end_matches('/').to_string();

        debug!(base_url = %base_url, timeout = ?config.timeout, "transport initialized");

        Ok(Self {
            client,
            base_url,
            timeout: config.timeout,
            tokens,
            auth_events,
        })
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Token store consulted before each request.
    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    /// Subscribe to [`AuthEvent`]s.
    pub fn subscribe_auth(&self) -> broadcast::Receiver<AuthEvent> {
        self.auth_events.subscribe()
    }

    /// Absolute URL for a request path.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    /// Send one request and decode the JSON response body.
    ///
    /// An empty success body decodes as JSON `null`.
    pub async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        let mut request = self.client.request(method.clone(), &url);
        if let Some(token) = self.tokens.token() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| self.map_reqwest(&e))?;
        let status = response.status();
        debug!(method = %method, path, status = status.as_u16(), "response received");

        if !status.is_success() {
            let text = match response.text().await {
                Ok(text) => text,
                Err(e) => {
                    debug!(path, status = status.as_u16(), error = %e, "error body unreadable");
                    String::new()
                }
            };
            let error = ApiError::from_status(status.as_u16(), text);
            if status == StatusCode::UNAUTHORIZED {
                self.on_unauthorized(&method, path);
            }
            return Err(error);
        }

        let bytes = response.bytes().await.map_err(|e| self.map_reqwest(&e))?;
        let decoded = if bytes.iter().all(u8::is_ascii_whitespace) {
            serde_json::from_value(serde_json::Value::Null)
        } else {
            serde_json::from_slice(&bytes)
        };
        decoded.map_err(|e| ApiError::Decode {
            message: e.to_string(),
        })
    }

    fn on_unauthorized(&self, method: &Method, path: &str) {
        warn!(method = %method, path, "request unauthorized, clearing stored token");
        if let Err(e) = self.tokens.clear() {
            warn!(error = %e, "failed to clear stored token");
        }
        // no receivers is fine
        let _ = self.auth_events.send(AuthEvent::LoginRequired {
            method: method.to_string(),
            path: path.to_string(),
        });
    }

    #[allow(clippy::cast_possible_truncation)] // timeouts are far below u64::MAX ms
    fn map_reqwest(&self, error: &reqwest::Error) -> ApiError {
        if error.is_timeout() {
            ApiError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else if error.is_builder() {
            ApiError::InvalidRequest {
                message: error.to_string(),
            }
        } else {
            ApiError::Network {
                message: error.to_string(),
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
