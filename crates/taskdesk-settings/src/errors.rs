//! Settings error types.

use std::path::PathBuf;

use thiserror::Error;

/// A settings file that cannot be used, or a value that cannot work.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file exists but could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid JSON or has wrongly typed values.
    #[error("malformed settings JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A value the client cannot run with.
    #[error("{key}: {reason}")]
    InvalidValue {
        /// camelCase path of the offending key, e.g. `api.baseUrl`.
        key: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl SettingsError {
    pub(crate) fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key,
            reason: reason.into(),
        }
    }
}

/// Result type for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
