//! Cache keys.

use std::fmt;

use taskdesk_core::TaskId;

/// Identity of a cached query.
///
/// Keys match exactly; invalidating [`QueryKey::TaskList`] leaves by-id
/// entries alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// The full task list.
    TaskList,
    /// One task by id.
    Task(TaskId),
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TaskList => f.write_str("tasks"),
            Self::Task(id) => write!(f, "tasks/{id}"),
        }
    }
}
