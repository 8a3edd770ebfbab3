//! Auth error types.

use std::path::PathBuf;

/// Failure to change the stored token.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Could not create or write the token file.
    #[error("cannot write token file {}: {source}", path.display())]
    Write {
        /// Token file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Could not delete the token file.
    #[error("cannot remove token file {}: {source}", path.display())]
    Remove {
        /// Token file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The token record could not be encoded.
    #[error("cannot encode token record: {0}")]
    Encode(#[from] serde_json::Error),

    /// Refused to store a blank token.
    #[error("token must not be empty")]
    EmptyToken,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
