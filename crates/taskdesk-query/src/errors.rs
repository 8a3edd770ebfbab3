//! Errors returned by task actions.

use taskdesk_client::ApiError;
use taskdesk_core::InputError;

/// Failure of a task action: either the input was rejected locally or the
/// backend call failed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    /// Rejected before any request was made.
    #[error(transparent)]
    Input(#[from] InputError),

    /// Backend call failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl TaskError {
    /// The backend error, if this is one.
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            Self::Api(e) => Some(e),
            Self::Input(_) => None,
        }
    }

    /// The validation error, if this is one.
    pub fn as_input(&self) -> Option<&InputError> {
        match self {
            Self::Input(e) => Some(e),
            Self::Api(_) => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
