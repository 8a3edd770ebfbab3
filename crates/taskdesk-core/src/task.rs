//! Task entities as exchanged with the backend.
//!
//! The wire format is snake_case JSON:
//!
//! ```json
//! { "id": 1, "title": "Write report", "category": "work",
//!   "created_at": "2024-01-15T10:30:00Z", "updated_at": "2024-01-15T10:30:00Z" }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::InputError;

/// Server-assigned task identifier.
///
/// Zero is never a valid id; queries keyed on it stay disabled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(u64);

impl TaskId {
    /// Wrap a raw id.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Whether this id can address a task (non-zero).
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TaskId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// A task as returned by the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Server-assigned, immutable id.
    pub id: TaskId,
    /// Task title.
    pub title: String,
    /// Category value (see [`crate::categories`]).
    pub category: String,
    /// Creation timestamp (ISO-8601), server-assigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Last update timestamp (ISO-8601), server-assigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Mutable subset of a task, sent on create and update.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInput {
    /// Task title.
    pub title: String,
    /// Category value.
    pub category: String,
}

impl TaskInput {
    /// Build an input from borrowed parts.
    pub fn new(title: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            category: category.into(),
        }
    }

    /// Check the input and return the form that goes over the wire.
    ///
    /// Title and category are trimmed. Either one being empty afterwards
    /// rejects the input.
    pub fn validated(&self) -> Result<Self, InputError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(InputError::EmptyTitle);
        }
        let category = self.category.trim();
        if category.is_empty() {
            return Err(InputError::EmptyCategory);
        }
        Ok(Self::new(title, category))
    }
}

/// Confirmation body returned by a delete.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteTaskResponse {
    /// Human-readable confirmation.
    pub message: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
