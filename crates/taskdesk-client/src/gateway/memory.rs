//! In-process [`TaskGateway`] with backend-like behavior.
//!
//! Assigns ids and timestamps, answers unknown ids with 404 and blank fields
//! with 400, the way the REST backend does. Tests can count calls per
//! operation, queue failures and hold calls at a gate to observe in-flight
//! state.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use chrono::SecondsFormat;
use parking_lot::Mutex;
use tokio::sync::watch;

use taskdesk_core::{DeleteTaskResponse, Task, TaskId, TaskInput};

use crate::errors::ApiError;
use crate::gateway::TaskGateway;

/// Gateway operation, for call counting and failure injection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GatewayOp {
    /// `get_all_tasks`
    GetAll,
    /// `create_task`
    Create,
    /// `get_task_by_id`
    GetById,
    /// `update_task`
    Update,
    /// `delete_task`
    Delete,
}

#[derive(Default)]
struct State {
    tasks: Vec<Task>,
    next_id: u64,
    calls: HashMap<GatewayOp, usize>,
    failures: HashMap<GatewayOp, VecDeque<ApiError>>,
}

/// In-memory task backend.
pub struct InMemoryTaskGateway {
    state: Mutex<State>,
    gate: watch::Sender<bool>,
}

impl Default for InMemoryTaskGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryTaskGateway {
    /// Empty backend.
    pub fn new() -> Self {
        let (gate, _) = watch::channel(false);
        Self {
            state: Mutex::new(State {
                next_id: 1,
                ..State::default()
            }),
            gate,
        }
    }

    /// Backend seeded with tasks. New ids continue after the highest seeded id.
    pub fn with_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        let gateway = Self::new();
        {
            let mut state = gateway.state.lock();
            state.tasks.extend(tasks);
            state.next_id = state
                .tasks
                .iter()
                .map(|t| t.id.get())
                .max()
                .map_or(1, |max| max + 1);
        }
        gateway
    }

    /// Current backend contents.
    pub fn tasks(&self) -> Vec<Task> {
        self.state.lock().tasks.clone()
    }

    /// Number of calls made for an operation, including failed and held ones.
    pub fn calls(&self, op: GatewayOp) -> usize {
        self.state.lock().calls.get(&op).copied().unwrap_or(0)
    }

    /// Make the next call of `op` fail with `error`. Queued failures are
    /// consumed in order.
    pub fn fail_next(&self, op: GatewayOp, error: ApiError) {
        self.state
            .lock()
            .failures
            .entry(op)
            .or_default()
            .push_back(error);
    }

    /// Hold every subsequent call until [`resume`](Self::resume).
    pub fn pause(&self) {
        let _ = self.gate.send_replace(true);
    }

    /// Release held calls.
    pub fn resume(&self) {
        let _ = self.gate.send_replace(false);
    }

    /// Count the call, wait at the gate, then apply any queued failure.
    async fn enter(&self, op: GatewayOp) -> Result<(), ApiError> {
        *self.state.lock().calls.entry(op).or_insert(0) += 1;

        let mut rx = self.gate.subscribe();
        let _ = rx.wait_for(|paused| !*paused).await;

        let failure = self
            .state
            .lock()
            .failures
            .get_mut(&op)
            .and_then(VecDeque::pop_front);
        match failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn not_found() -> ApiError {
    ApiError::from_status(404, r#"{"detail":"Not found."}"#)
}

fn check_input(input: &TaskInput) -> Result<(), ApiError> {
    let mut fields = serde_json::Map::new();
    if input.title.trim().is_empty() {
        let _ = fields.insert(
            "title".into(),
            serde_json::json!(["This field may not be blank."]),
        );
    }
    if input.category.trim().is_empty() {
        let _ = fields.insert(
            "category".into(),
            serde_json::json!(["This field may not be blank."]),
        );
    }
    if fields.is_empty() {
        Ok(())
    } else {
        Err(ApiError::from_status(
            400,
            serde_json::Value::Object(fields).to_string(),
        ))
    }
}

#[async_trait]
impl TaskGateway for InMemoryTaskGateway {
    async fn get_all_tasks(&self) -> Result<Vec<Task>, ApiError> {
        self.enter(GatewayOp::GetAll).await?;
        Ok(self.tasks())
    }

    async fn create_task(&self, input: &TaskInput) -> Result<Task, ApiError> {
        self.enter(GatewayOp::Create).await?;
        check_input(input)?;

        let mut state = self.state.lock();
        let stamp = now();
        let task = Task {
            id: TaskId::new(state.next_id),
            title: input.title.clone(),
            category: input.category.clone(),
            created_at: Some(stamp.clone()),
            updated_at: Some(stamp),
        };
        state.next_id += 1;
        state.tasks.push(task.clone());
        Ok(task)
    }

    async fn get_task_by_id(&self, id: TaskId) -> Result<Task, ApiError> {
        self.enter(GatewayOp::GetById).await?;
        self.state
            .lock()
            .tasks
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn update_task(&self, id: TaskId, input: &TaskInput) -> Result<Task, ApiError> {
        self.enter(GatewayOp::Update).await?;
        check_input(input)?;

        let mut state = self.state.lock();
        let task = state
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(not_found)?;
        task.title.clone_from(&input.title);
        task.category.clone_from(&input.category);
        task.updated_at = Some(now());
        Ok(task.clone())
    }

    async fn delete_task(&self, id: TaskId) -> Result<DeleteTaskResponse, ApiError> {
        self.enter(GatewayOp::Delete).await?;

        let mut state = self.state.lock();
        let index = state
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(not_found)?;
        let _ = state.tasks.remove(index);
        Ok(DeleteTaskResponse {
            message: "Task deleted successfully".to_string(),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
