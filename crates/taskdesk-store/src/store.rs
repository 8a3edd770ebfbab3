//! Task store.
//!
//! Derived values are recomputed from the cached list on every read. Reads
//! through [`TaskStore::tasks`] and its derivations start a background
//! refetch when the list is stale; [`TaskStore::get_task_by_id`] and
//! [`TaskStore::loading`] never do.

use std::sync::Arc;

use indexmap::IndexMap;
use tokio::sync::watch;
use tracing::warn;

use taskdesk_client::{ApiError, TaskGateway};
use taskdesk_core::{
    DeleteTaskResponse, Page, Task, TaskId, TaskInput, TaskStats, group_tasks_by_category,
    paginate, task_stats,
};
use taskdesk_query::{CacheConfig, MutationStatus, QueryStatus, TaskError, TaskQueries};

/// Everything the store exposes, read at one point in time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskStoreState {
    /// Cached tasks, empty before the first successful fetch.
    pub tasks: Vec<Task>,
    /// `tasks.len()`.
    pub tasks_count: usize,
    /// Tasks grouped by category in first-appearance order.
    pub tasks_by_category: IndexMap<String, Vec<Task>>,
    /// Summary figures.
    pub stats: TaskStats,
    /// List pending or any mutation pending.
    pub loading: bool,
    /// First of list, create, update and delete errors.
    pub error: Option<ApiError>,
    /// List query status.
    pub list_status: QueryStatus,
    /// Create mutation status.
    pub create_status: MutationStatus,
    /// Update mutation status.
    pub update_status: MutationStatus,
    /// Delete mutation status.
    pub delete_status: MutationStatus,
}

/// Facade over [`TaskQueries`].
#[derive(Clone)]
pub struct TaskStore {
    queries: TaskQueries,
}

impl TaskStore {
    /// Store over `gateway` with its own cache.
    pub fn new(gateway: Arc<dyn TaskGateway>, config: CacheConfig) -> Self {
        Self::from_queries(TaskQueries::new(gateway, config))
    }

    /// Store over an existing query layer.
    pub fn from_queries(queries: TaskQueries) -> Self {
        Self { queries }
    }

    /// The underlying query layer.
    pub fn queries(&self) -> &TaskQueries {
        &self.queries
    }

    /// Receiver woken on every state change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.queries.subscribe()
    }

    // ── Derived reads ───────────────────────────────────────────────────────

    /// Cached tasks. Empty until the first fetch succeeds.
    pub fn tasks(&self) -> Vec<Task> {
        self.queries.tasks().data.unwrap_or_default()
    }

    /// Number of cached tasks.
    pub fn tasks_count(&self) -> usize {
        self.tasks().len()
    }

    /// Cached tasks grouped by category.
    pub fn tasks_by_category(&self) -> IndexMap<String, Vec<Task>> {
        group_tasks_by_category(&self.tasks())
    }

    /// Summary figures for the cached tasks.
    pub fn stats(&self) -> TaskStats {
        task_stats(&self.tasks())
    }

    /// One page of the cached tasks (1-based, clamped).
    pub fn page(&self, page: usize, per_page: usize) -> Page {
        paginate(&self.tasks(), page, per_page)
    }

    /// Whether the list or any mutation is in flight.
    pub fn loading(&self) -> bool {
        self.queries.peek_tasks().is_pending()
            || self.queries.create_state().is_pending()
            || self.queries.update_state().is_pending()
            || self.queries.delete_state().is_pending()
    }

    /// First error among list, create, update and delete, in that order.
    pub fn error(&self) -> Option<ApiError> {
        self.queries
            .peek_tasks()
            .error
            .or_else(|| self.queries.create_state().error)
            .or_else(|| self.queries.update_state().error)
            .or_else(|| self.queries.delete_state().error)
    }

    /// All reads at once.
    pub fn snapshot(&self) -> TaskStoreState {
        let list = self.queries.tasks();
        let create = self.queries.create_state();
        let update = self.queries.update_state();
        let delete = self.queries.delete_state();

        let tasks = list.data.unwrap_or_default();
        let loading = list.status == QueryStatus::Pending
            || create.is_pending()
            || update.is_pending()
            || delete.is_pending();
        let error = list
            .error
            .or(create.error)
            .or(update.error)
            .or(delete.error);

        TaskStoreState {
            tasks_count: tasks.len(),
            tasks_by_category: group_tasks_by_category(&tasks),
            stats: task_stats(&tasks),
            tasks,
            loading,
            error,
            list_status: list.status,
            create_status: create.status,
            update_status: update.status,
            delete_status: delete.status,
        }
    }

    /// Cached task with `id`. Makes no request.
    pub fn get_task_by_id(&self, id: TaskId) -> Option<Task> {
        self.queries
            .peek_tasks()
            .data?
            .into_iter()
            .find(|task| task.id == id)
    }

    // ── Actions ─────────────────────────────────────────────────────────────

    /// Refetch the list and wait for it.
    pub async fn fetch_tasks(&self) -> Result<Vec<Task>, ApiError> {
        self.queries.fetch_tasks().await
    }

    /// Fetch one task from the backend. A zero id yields `None`.
    pub async fn fetch_task(&self, id: TaskId) -> Result<Option<Task>, ApiError> {
        self.queries.fetch_task(id).await
    }

    /// Create a task, then refresh the list.
    pub async fn create_task(&self, input: &TaskInput) -> Result<Task, TaskError> {
        let task = self.queries.create_task(input).await?;
        self.refresh("create").await;
        Ok(task)
    }

    /// Update a task, then refresh the list.
    pub async fn update_task(&self, id: TaskId, input: &TaskInput) -> Result<Task, TaskError> {
        let task = self.queries.update_task(id, input).await?;
        self.refresh("update").await;
        Ok(task)
    }

    /// Delete a task, then refresh the list.
    pub async fn delete_task(&self, id: TaskId) -> Result<DeleteTaskResponse, TaskError> {
        let response = self.queries.delete_task(id).await?;
        self.refresh("delete").await;
        Ok(response)
    }

    /// Reset mutation errors and refetch the list.
    pub async fn clear_error(&self) -> Result<Vec<Task>, ApiError> {
        self.queries.clear_error().await
    }

    /// Stop background work and drop cached data.
    pub fn shutdown(&self) {
        self.queries.shutdown();
    }

    async fn refresh(&self, after: &'static str) {
        if let Err(e) = self.queries.fetch_tasks().await {
            warn!(after, error = %e, "task list refresh failed");
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
