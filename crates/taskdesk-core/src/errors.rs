//! Input validation errors.

use thiserror::Error;

/// A task input rejected before it reaches the network.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InputError {
    /// Title is empty after trimming whitespace.
    #[error("task title must not be empty")]
    EmptyTitle,
    /// Category is empty after trimming whitespace.
    #[error("task category must not be empty")]
    EmptyCategory,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
