//! API error type.
//!
//! [`ApiError`] is `Clone` so one failure can be recorded in query or
//! mutation state and also returned to the caller that triggered it.

/// A failed backend call.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// No response within the transport timeout.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout {
        /// Configured timeout in milliseconds.
        timeout_ms: u64,
    },

    /// No response received (connection refused, DNS, reset, ...).
    #[error("network error: {message}")]
    Network {
        /// Underlying error description.
        message: String,
    },

    /// Backend answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Server-provided message, or a generic one when the body has none.
        message: String,
        /// Raw response body.
        body: String,
    },

    /// Response body did not match the expected shape.
    #[error("failed to decode response: {message}")]
    Decode {
        /// Decoder error description.
        message: String,
    },

    /// The request could not be built.
    #[error("invalid request: {message}")]
    InvalidRequest {
        /// Error description.
        message: String,
    },
}

impl ApiError {
    /// Build a status error, pulling a message out of the body when it has one.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        let message = extract_message(&body)
            .unwrap_or_else(|| format!("Request failed with status code {status}"));
        Self::Status {
            status,
            message,
            body,
        }
    }

    /// HTTP status, for [`ApiError::Status`].
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the backend rejected the credentials (401).
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Whether the addressed resource does not exist (404).
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Error category string for logs and user-facing summaries.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::Network { .. } => "network",
            Self::Status { status, .. } => match status {
                400 | 422 => "validation",
                401 => "auth",
                403 => "forbidden",
                404 => "not_found",
                500..=599 => "server",
                _ => "http",
            },
            Self::Decode { .. } => "decode",
            Self::InvalidRequest { .. } => "request",
        }
    }
}

/// Pick a human message out of a JSON error body.
///
/// Understands `{"detail": ..}`, `{"message": ..}`, `{"error": ..}` and
/// field-error maps like `{"title": ["This field may not be blank."]}`.
fn extract_message(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    let object = json.as_object()?;

    for key in ["detail", "message", "error"] {
        if let Some(text) = object.get(key).and_then(serde_json::Value::as_str) {
            return Some(text.to_string());
        }
    }

    let fields: Vec<String> = object
        .iter()
        .filter_map(|(field, value)| {
            let first = match value {
                serde_json::Value::Array(items) => items.first()?.as_str()?,
                serde_json::Value::String(s) => s.as_str(),
                _ => return None,
            };
            Some(format!("{field}: {first}"))
        })
        .collect();

    (!fields.is_empty()).then(|| fields.join("; "))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
