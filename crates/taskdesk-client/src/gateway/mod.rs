//! Task gateway abstraction.
//!
//! [`TaskGateway`] is the seam between the cache layer and the backend. The
//! HTTP implementation maps each operation onto one REST call; the in-memory
//! implementation stands in for the backend in tests.

pub mod http;
pub mod memory;

use async_trait::async_trait;

use taskdesk_core::{DeleteTaskResponse, Task, TaskId, TaskInput};

use crate::errors::ApiError;

/// Remote task operations.
///
/// Implementations do not validate inputs and never retry.
#[async_trait]
pub trait TaskGateway: Send + Sync {
    /// All tasks. An empty list is a valid result.
    async fn get_all_tasks(&self) -> Result<Vec<Task>, ApiError>;

    /// Create a task; the backend assigns id and timestamps.
    async fn create_task(&self, input: &TaskInput) -> Result<Task, ApiError>;

    /// One task by id. A missing task surfaces as a 404 status error.
    async fn get_task_by_id(&self, id: TaskId) -> Result<Task, ApiError>;

    /// Replace the mutable fields of a task.
    async fn update_task(&self, id: TaskId, input: &TaskInput) -> Result<Task, ApiError>;

    /// Delete a task.
    async fn delete_task(&self, id: TaskId) -> Result<DeleteTaskResponse, ApiError>;
}
