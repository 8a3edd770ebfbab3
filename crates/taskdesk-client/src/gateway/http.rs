//! REST implementation of [`TaskGateway`].
//!
//! | Operation | Method | Path |
//! |---|---|---|
//! | list | GET | `/tasks/` |
//! | create | POST | `/tasks/` |
//! | read | GET | `/tasks/{id}/` |
//! | update | PUT | `/tasks/{id}/` |
//! | delete | DELETE | `/tasks/{id}/` |

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;

use taskdesk_core::{DeleteTaskResponse, Task, TaskId, TaskInput};

use crate::errors::ApiError;
use crate::gateway::TaskGateway;
use crate::transport::Transport;

/// Collection path.
const TASKS_PATH: &str = "/tasks/";

/// Confirmation used when a delete returns no body.
const DEFAULT_DELETE_MESSAGE: &str = "Task deleted successfully";

fn task_path(id: TaskId) -> String {
    format!("/tasks/{id}/")
}

fn to_body(input: &TaskInput) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(input).map_err(|e| ApiError::InvalidRequest {
        message: format!("failed to encode task input: {e}"),
    })
}

/// Gateway backed by the REST API.
pub struct HttpTaskGateway {
    transport: Arc<Transport>,
}

impl HttpTaskGateway {
    /// Gateway over a shared transport.
    pub fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }

    /// Underlying transport.
    pub fn transport(&self) -> &Arc<Transport> {
        &self.transport
    }
}

#[async_trait]
impl TaskGateway for HttpTaskGateway {
    async fn get_all_tasks(&self) -> Result<Vec<Task>, ApiError> {
        self.transport.send(Method::GET, TASKS_PATH, None).await
    }

    async fn create_task(&self, input: &TaskInput) -> Result<Task, ApiError> {
        let body = to_body(input)?;
        self.transport.send(Method::POST, TASKS_PATH, Some(&body)).await
    }

    async fn get_task_by_id(&self, id: TaskId) -> Result<Task, ApiError> {
        self.transport.send(Method::GET, &task_path(id), None).await
    }

    async fn update_task(&self, id: TaskId, input: &TaskInput) -> Result<Task, ApiError> {
        let body = to_body(input)?;
        self.transport
            .send(Method::PUT, &task_path(id), Some(&body))
            .await
    }

    async fn delete_task(&self, id: TaskId) -> Result<DeleteTaskResponse, ApiError> {
        let response: Option<DeleteTaskResponse> = self
            .transport
            .send(Method::DELETE, &task_path(id), None)
            .await?;
        Ok(response.unwrap_or_else(|| DeleteTaskResponse {
            message: DEFAULT_DELETE_MESSAGE.to_string(),
        }))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
