//! Settings types.
//!
//! The JSON file uses camelCase keys. Every section has defaults, so a
//! partial file only needs the keys it overrides.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Root settings object.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskdeskSettings {
    /// Backend connection.
    pub api: ApiSettings,
    /// Query cache tuning.
    pub cache: CacheSettings,
    /// Bearer token storage.
    pub auth: AuthSettings,
    /// Log output.
    pub logging: LoggingSettings,
}

impl TaskdeskSettings {
    /// Check values that would make the client unusable.
    pub fn validate(&self) -> Result<()> {
        let url = self.api.base_url.trim();
        if url.is_empty() {
            return Err(SettingsError::invalid("api.baseUrl", "must not be empty"));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(SettingsError::invalid(
                "api.baseUrl",
                format!("must be an http(s) URL, got {url}"),
            ));
        }
        if self.api.timeout_ms == 0 {
            return Err(SettingsError::invalid("api.timeoutMs", "must be positive"));
        }
        Ok(())
    }
}

/// Backend connection settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiSettings {
    /// Base URL that REST paths are appended to.
    pub base_url: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl ApiSettings {
    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            timeout_ms: 5000,
        }
    }
}

/// Query cache settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CacheSettings {
    /// How long the task list stays fresh, in milliseconds.
    pub list_stale_ms: u64,
    /// How long a single-task entry stays fresh, in milliseconds.
    pub detail_stale_ms: u64,
}

impl CacheSettings {
    /// List staleness window.
    pub fn list_stale_time(&self) -> Duration {
        Duration::from_millis(self.list_stale_ms)
    }

    /// Single-task staleness window.
    pub fn detail_stale_time(&self) -> Duration {
        Duration::from_millis(self.detail_stale_ms)
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            list_stale_ms: 5 * 60 * 1000,
            detail_stale_ms: 0,
        }
    }
}

/// Token storage settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthSettings {
    /// Token file path. `None` means `~/.taskdesk/token.json`.
    pub token_file: Option<String>,
}

/// Logging settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
