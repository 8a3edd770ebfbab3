//! # taskdesk-core
//!
//! Foundation types shared by every taskdesk crate:
//!
//! - **Tasks**: [`Task`], [`TaskInput`] and the [`TaskId`] newtype
//! - **Categories**: the fixed category catalogue and display labels
//! - **Views**: pure derived views over a task list (grouping, stats, paging)
//! - **Errors**: [`InputError`] for inputs rejected before any request
//! - **Logging**: [`logging::init_subscriber`] for binaries

#![deny(unsafe_code)]

pub mod categories;
pub mod errors;
pub mod logging;
pub mod task;
pub mod views;

pub use categories::{Category, TASK_CATEGORIES, category_label};
pub use errors::InputError;
pub use task::{DeleteTaskResponse, Task, TaskId, TaskInput};
pub use views::{Page, TaskStats, group_tasks_by_category, paginate, task_stats};

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
