//! Task queries and mutations.
//!
//! [`TaskQueries`] owns the cache for one backend. Reads return a snapshot
//! immediately; a stale entry additionally starts a background refetch on
//! the ambient tokio runtime. Mutations validate their input, call the
//! gateway and apply their cache side effects on success:
//!
//! | Mutation | On success |
//! |---|---|
//! | create | invalidate the list |
//! | update | write the returned task into its by-id entry, invalidate the list |
//! | delete | purge the by-id entry, invalidate the list |

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use taskdesk_client::{ApiError, TaskGateway};
use taskdesk_core::{DeleteTaskResponse, Task, TaskId, TaskInput};

use crate::cache::{FetchTicket, QueryCache, QueryData};
use crate::config::CacheConfig;
use crate::errors::TaskError;
use crate::key::QueryKey;
use crate::mutation::Mutation;
use crate::state::{MutationState, QueryState};

struct Inner {
    gateway: Arc<dyn TaskGateway>,
    cache: QueryCache,
    config: CacheConfig,
    create: Mutation<Task>,
    update: Mutation<Task>,
    delete: Mutation<DeleteTaskResponse>,
    cancel: CancellationToken,
}

impl Inner {
    fn stale_time(&self, key: QueryKey) -> Duration {
        match key {
            QueryKey::TaskList => self.config.list_stale_time,
            QueryKey::Task(_) => self.config.detail_stale_time,
        }
    }

    async fn run_fetch(&self, ticket: FetchTicket) -> Result<QueryData, ApiError> {
        let guard = self.cache.guarded_fetch(ticket);
        let result = match ticket.key {
            QueryKey::TaskList => self
                .gateway
                .get_all_tasks()
                .await
                .map(QueryData::TaskList),
            QueryKey::Task(id) => self.gateway.get_task_by_id(id).await.map(QueryData::Task),
        };
        let _ = guard.finish(result.clone());
        result
    }
}

/// Cached access to tasks. Cheap to clone; clones share one cache.
#[derive(Clone)]
pub struct TaskQueries {
    inner: Arc<Inner>,
}

impl TaskQueries {
    /// Queries over `gateway` with the given staleness windows.
    pub fn new(gateway: Arc<dyn TaskGateway>, config: CacheConfig) -> Self {
        let cache = QueryCache::new();
        let notifier = cache.notifier().clone();
        Self {
            inner: Arc::new(Inner {
                gateway,
                config,
                create: Mutation::new("create_task", notifier.clone()),
                update: Mutation::new("update_task", notifier.clone()),
                delete: Mutation::new("delete_task", notifier),
                cache,
                cancel: CancellationToken::new(),
            }),
        }
    }

    /// The underlying cache.
    pub fn cache(&self) -> &QueryCache {
        &self.inner.cache
    }

    /// Staleness windows in use.
    pub fn config(&self) -> CacheConfig {
        self.inner.config
    }

    /// Receiver woken on every query or mutation state change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.cache.subscribe()
    }

    // ── Queries ─────────────────────────────────────────────────────────────

    /// The task list, refetching in the background when stale.
    pub fn tasks(&self) -> QueryState<Vec<Task>> {
        self.refresh_if_stale(QueryKey::TaskList);
        self.peek_tasks()
    }

    /// The task list without triggering a refetch.
    pub fn peek_tasks(&self) -> QueryState<Vec<Task>> {
        self.peek(QueryKey::TaskList)
            .and_then_data(QueryData::into_tasks)
    }

    /// Fetch the task list now and wait for it.
    pub async fn fetch_tasks(&self) -> Result<Vec<Task>, ApiError> {
        let ticket = self.inner.cache.begin_fetch(QueryKey::TaskList);
        let data = self.inner.run_fetch(ticket).await?;
        Ok(data.into_tasks().unwrap_or_default())
    }

    /// One task, refetching in the background when stale.
    ///
    /// A zero id disables the query: it stays idle and makes no request.
    pub fn task(&self, id: TaskId) -> QueryState<Task> {
        if !id.is_valid() {
            return QueryState::idle();
        }
        self.refresh_if_stale(QueryKey::Task(id));
        self.peek_task(id)
    }

    /// One task without triggering a refetch.
    pub fn peek_task(&self, id: TaskId) -> QueryState<Task> {
        if !id.is_valid() {
            return QueryState::idle();
        }
        self.peek(QueryKey::Task(id))
            .and_then_data(QueryData::into_task)
    }

    /// Fetch one task now and wait for it. A zero id yields `None` without a
    /// request.
    pub async fn fetch_task(&self, id: TaskId) -> Result<Option<Task>, ApiError> {
        if !id.is_valid() {
            return Ok(None);
        }
        let ticket = self.inner.cache.begin_fetch(QueryKey::Task(id));
        let data = self.inner.run_fetch(ticket).await?;
        Ok(data.into_task())
    }

    fn peek(&self, key: QueryKey) -> QueryState<QueryData> {
        self.inner.cache.state(&key, self.inner.stale_time(key))
    }

    fn refresh_if_stale(&self, key: QueryKey) {
        if self.inner.cancel.is_cancelled() {
            return;
        }
        let Ok(handle) = Handle::try_current() else {
            debug!(%key, "no runtime; skipping background refetch");
            return;
        };
        let Some(ticket) = self
            .inner
            .cache
            .begin_fetch_if_stale(key, self.inner.stale_time(key))
        else {
            return;
        };

        let inner = Arc::clone(&self.inner);
        let _ = handle.spawn(async move {
            tokio::select! {
                () = inner.cancel.cancelled() => {
                    debug!(%key, "background refetch cancelled");
                }
                result = inner.run_fetch(ticket) => {
                    if let Err(e) = result {
                        warn!(%key, error = %e, category = e.category(), "background refetch failed");
                    }
                }
            }
        });
    }

    // ── Mutations ───────────────────────────────────────────────────────────

    /// Create a task. Invalid input is rejected without touching mutation
    /// state or the network.
    pub async fn create_task(&self, input: &TaskInput) -> Result<Task, TaskError> {
        let input = input.validated()?;
        let inner = &self.inner;
        let task = inner
            .create
            .run(inner.gateway.create_task(&input), |_| {
                inner.cache.invalidate(&QueryKey::TaskList);
            })
            .await?;
        info!(id = %task.id, category = %task.category, "task created");
        Ok(task)
    }

    /// Update a task. Invalid input is rejected without touching mutation
    /// state or the network.
    pub async fn update_task(&self, id: TaskId, input: &TaskInput) -> Result<Task, TaskError> {
        let input = input.validated()?;
        let inner = &self.inner;
        let task = inner
            .update
            .run(inner.gateway.update_task(id, &input), |task| {
                inner
                    .cache
                    .set_query_data(QueryKey::Task(id), QueryData::Task(task.clone()));
                inner.cache.invalidate(&QueryKey::TaskList);
            })
            .await?;
        info!(%id, "task updated");
        Ok(task)
    }

    /// Delete a task.
    pub async fn delete_task(&self, id: TaskId) -> Result<DeleteTaskResponse, TaskError> {
        let inner = &self.inner;
        let response = inner
            .delete
            .run(inner.gateway.delete_task(id), |_| {
                inner.cache.remove(&QueryKey::Task(id));
                inner.cache.invalidate(&QueryKey::TaskList);
            })
            .await?;
        info!(%id, "task deleted");
        Ok(response)
    }

    /// State of the latest create.
    pub fn create_state(&self) -> MutationState<Task> {
        self.inner.create.state()
    }

    /// State of the latest update.
    pub fn update_state(&self) -> MutationState<Task> {
        self.inner.update.state()
    }

    /// State of the latest delete.
    pub fn delete_state(&self) -> MutationState<DeleteTaskResponse> {
        self.inner.delete.state()
    }

    /// Reset all three mutations to idle.
    pub fn reset_mutations(&self) {
        self.inner.create.reset();
        self.inner.update.reset();
        self.inner.delete.reset();
    }

    /// Reset the mutations and refetch the list. Cached data stays readable
    /// until the refetch lands; a successful refetch clears the list error.
    pub async fn clear_error(&self) -> Result<Vec<Task>, ApiError> {
        self.reset_mutations();
        self.fetch_tasks().await
    }

    /// Cancel background refetches and drop every cached entry. Background
    /// refetches stay disabled afterwards; explicit fetches still work.
    pub fn shutdown(&self) {
        self.inner.cancel.cancel();
        self.inner.cache.clear();
        debug!("task queries shut down");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::QueryStatus;
    use assert_matches::assert_matches;
    use taskdesk_client::{GatewayOp, InMemoryTaskGateway};
    use taskdesk_core::InputError;

    fn task(id: u64, title: &str, category: &str) -> Task {
        Task {
            id: TaskId::new(id),
            title: title.into(),
            category: category.into(),
            created_at: None,
            updated_at: None,
        }
    }

    fn setup(tasks: Vec<Task>) -> (Arc<InMemoryTaskGateway>, TaskQueries) {
        let gateway = Arc::new(InMemoryTaskGateway::with_tasks(tasks));
        let queries = TaskQueries::new(gateway.clone(), CacheConfig::default());
        (gateway, queries)
    }

    async fn wait_until(queries: &TaskQueries, pred: impl Fn(&TaskQueries) -> bool) {
        let mut rx = queries.subscribe();
        tokio::time::timeout(Duration::from_secs(5), async {
            while !pred(queries) {
                rx.changed().await.unwrap();
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn first_read_starts_background_fetch() {
        let (gateway, queries) = setup(vec![task(1, "a", "work")]);

        let state = queries.tasks();
        assert!(state.is_pending());
        assert!(state.is_fetching);
        assert!(state.data.is_none());

        wait_until(&queries, |q| q.peek_tasks().is_success()).await;
        assert_eq!(queries.peek_tasks().data.unwrap().len(), 1);
        assert_eq!(gateway.calls(GatewayOp::GetAll), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn fresh_list_is_served_from_cache_until_window_passes() {
        let (gateway, queries) = setup(vec![task(1, "a", "work")]);
        let _ = queries.fetch_tasks().await.unwrap();

        let state = queries.tasks();
        assert!(state.is_success());
        assert!(!state.is_stale);
        assert_eq!(gateway.calls(GatewayOp::GetAll), 1);

        tokio::time::advance(Duration::from_secs(5 * 60)).await;
        let state = queries.tasks();
        assert!(state.is_pending());
        assert_eq!(state.data.map(|t| t.len()), Some(1));

        wait_until(&queries, |q| q.peek_tasks().is_success()).await;
        assert_eq!(gateway.calls(GatewayOp::GetAll), 2);
    }

    #[tokio::test]
    async fn repeated_stale_reads_start_one_fetch() {
        let (gateway, queries) = setup(vec![]);
        gateway.pause();
        let _ = queries.tasks();
        let _ = queries.tasks();
        let _ = queries.tasks();
        gateway.resume();

        wait_until(&queries, |q| q.peek_tasks().is_success()).await;
        assert_eq!(gateway.calls(GatewayOp::GetAll), 1);
    }

    #[tokio::test]
    async fn zero_id_query_stays_idle() {
        let (gateway, queries) = setup(vec![task(1, "a", "work")]);
        let state = queries.task(TaskId::new(0));
        assert_eq!(state.status, QueryStatus::Idle);
        assert!(state.data.is_none());
        assert_eq!(queries.fetch_task(TaskId::new(0)).await, Ok(None));

        tokio::task::yield_now().await;
        assert_eq!(gateway.calls(GatewayOp::GetById), 0);
    }

    #[tokio::test]
    async fn by_id_query_fetches_and_is_always_stale() {
        let (gateway, queries) = setup(vec![task(1, "a", "work")]);
        let fetched = queries.fetch_task(TaskId::new(1)).await.unwrap();
        assert_eq!(fetched.map(|t| t.title), Some("a".to_string()));

        let state = queries.peek_task(TaskId::new(1));
        assert!(state.is_success());
        assert!(state.is_stale);

        let _ = queries.task(TaskId::new(1));
        wait_until(&queries, |q| !q.peek_task(TaskId::new(1)).is_fetching).await;
        assert_eq!(gateway.calls(GatewayOp::GetById), 2);
    }

    #[tokio::test]
    async fn missing_task_surfaces_404() {
        let (_gateway, queries) = setup(vec![]);
        let err = queries.fetch_task(TaskId::new(9)).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(queries.peek_task(TaskId::new(9)).is_error());
    }

    #[tokio::test]
    async fn create_invalidates_list() {
        let (gateway, queries) = setup(vec![]);
        let _ = queries.fetch_tasks().await.unwrap();
        assert!(!queries.peek_tasks().is_stale);

        let created = queries
            .create_task(&TaskInput::new("  Write report ", "work"))
            .await
            .unwrap();
        assert_eq!(created.title, "Write report");
        assert!(queries.peek_tasks().is_stale);
        assert!(queries.create_state().is_success());
        assert_eq!(queries.create_state().data, Some(created.clone()));

        let _ = queries.tasks();
        wait_until(&queries, |q| !q.peek_tasks().is_stale).await;
        assert_eq!(queries.peek_tasks().data, Some(vec![created]));
        assert_eq!(gateway.calls(GatewayOp::GetAll), 2);
    }

    #[tokio::test]
    async fn update_writes_detail_entry_and_invalidates_list() {
        let (_gateway, queries) = setup(vec![task(1, "old", "work")]);
        let _ = queries.fetch_tasks().await.unwrap();

        let updated = queries
            .update_task(TaskId::new(1), &TaskInput::new("new", "home"))
            .await
            .unwrap();
        assert_eq!(queries.peek_task(TaskId::new(1)).data, Some(updated));
        assert!(queries.peek_tasks().is_stale);
        assert!(queries.update_state().is_success());
    }

    #[tokio::test]
    async fn delete_purges_detail_entry_and_invalidates_list() {
        let (gateway, queries) = setup(vec![task(1, "a", "work")]);
        let _ = queries.fetch_tasks().await.unwrap();
        let _ = queries.fetch_task(TaskId::new(1)).await.unwrap();

        let response = queries.delete_task(TaskId::new(1)).await.unwrap();
        assert_eq!(response.message, "Task deleted successfully");
        assert!(queries.cache().get(&QueryKey::Task(TaskId::new(1))).is_none());
        assert!(queries.peek_tasks().is_stale);
        assert!(gateway.tasks().is_empty());
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_gateway() {
        let (gateway, queries) = setup(vec![task(1, "a", "work")]);

        let err = queries
            .create_task(&TaskInput::new("   ", "work"))
            .await
            .unwrap_err();
        assert_matches!(err, TaskError::Input(InputError::EmptyTitle));

        let err = queries
            .update_task(TaskId::new(1), &TaskInput::new("x", " "))
            .await
            .unwrap_err();
        assert_matches!(err, TaskError::Input(InputError::EmptyCategory));

        let err = queries
            .update_task(TaskId::new(1), &TaskInput::new("  \t", "work"))
            .await
            .unwrap_err();
        assert_matches!(err, TaskError::Input(InputError::EmptyTitle));

        assert_eq!(gateway.calls(GatewayOp::Create), 0);
        assert_eq!(gateway.calls(GatewayOp::Update), 0);
        assert_eq!(queries.create_state(), MutationState::default());
        assert_eq!(queries.update_state(), MutationState::default());
    }

    #[tokio::test]
    async fn failed_mutation_records_and_returns_error() {
        let (gateway, queries) = setup(vec![]);
        gateway.fail_next(
            GatewayOp::Create,
            ApiError::from_status(500, r#"{"detail":"boom"}"#),
        );

        let err = queries
            .create_task(&TaskInput::new("a", "work"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "HTTP 500: boom");

        let state = queries.create_state();
        assert!(state.is_error());
        assert_eq!(state.error.map(|e| e.to_string()), Some("HTTP 500: boom".into()));
    }

    #[tokio::test]
    async fn mutation_flags_are_independent() {
        let (gateway, queries) = setup(vec![task(1, "a", "work")]);
        gateway.fail_next(GatewayOp::Delete, ApiError::from_status(403, ""));

        let _ = queries.create_task(&TaskInput::new("b", "home")).await.unwrap();
        let _ = queries.delete_task(TaskId::new(1)).await.unwrap_err();

        assert!(queries.create_state().is_success());
        assert!(queries.delete_state().is_error());
        assert_eq!(queries.update_state(), MutationState::default());
    }

    #[tokio::test]
    async fn reset_while_in_flight_hides_outcome() {
        let (gateway, queries) = setup(vec![]);
        let _ = queries.fetch_tasks().await.unwrap();
        gateway.pause();

        let pending = tokio::spawn({
            let queries = queries.clone();
            async move { queries.create_task(&TaskInput::new("a", "work")).await }
        });
        wait_until(&queries, |q| q.create_state().is_pending()).await;

        queries.reset_mutations();
        gateway.resume();
        assert!(pending.await.unwrap().is_ok());

        assert_eq!(queries.create_state(), MutationState::default());
        assert!(queries.peek_tasks().is_stale);
    }

    #[tokio::test]
    async fn invalidation_during_fetch_keeps_list_stale() {
        let (gateway, queries) = setup(vec![]);
        gateway.pause();

        let fetch = tokio::spawn({
            let queries = queries.clone();
            async move { queries.fetch_tasks().await }
        });
        wait_until(&queries, |q| q.peek_tasks().is_fetching).await;

        queries.cache().invalidate(&QueryKey::TaskList);
        gateway.resume();
        assert!(fetch.await.unwrap().is_ok());

        let state = queries.peek_tasks();
        assert!(state.is_success());
        assert!(state.is_stale);
    }

    #[tokio::test]
    async fn dropped_fetch_releases_entry() {
        let (gateway, queries) = setup(vec![]);
        gateway.pause();

        let out = tokio::time::timeout(Duration::from_millis(10), queries.fetch_tasks()).await;
        assert!(out.is_err());

        let state = queries.peek_tasks();
        assert!(!state.is_fetching);
        assert_eq!(state.status, QueryStatus::Idle);
    }

    #[tokio::test]
    async fn list_error_keeps_cached_data() {
        let (gateway, queries) = setup(vec![task(1, "a", "work")]);
        let _ = queries.fetch_tasks().await.unwrap();

        gateway.fail_next(GatewayOp::GetAll, ApiError::from_status(500, ""));
        assert!(queries.fetch_tasks().await.is_err());

        let state = queries.peek_tasks();
        assert!(state.is_error());
        assert_eq!(state.data.map(|t| t.len()), Some(1));
    }

    #[tokio::test]
    async fn clear_error_resets_mutations_and_refetches() {
        let (gateway, queries) = setup(vec![task(1, "a", "work")]);
        gateway.fail_next(GatewayOp::GetAll, ApiError::from_status(500, ""));
        gateway.fail_next(GatewayOp::Update, ApiError::from_status(400, ""));

        assert!(queries.fetch_tasks().await.is_err());
        let _ = queries
            .update_task(TaskId::new(1), &TaskInput::new("b", "work"))
            .await
            .unwrap_err();
        assert!(queries.update_state().is_error());

        let tasks = queries.clear_error().await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(queries.update_state(), MutationState::default());
        let state = queries.peek_tasks();
        assert!(state.is_success());
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn shutdown_clears_cache_and_stops_background_fetches() {
        let (gateway, queries) = setup(vec![task(1, "a", "work")]);
        let _ = queries.fetch_tasks().await.unwrap();

        queries.shutdown();
        assert_eq!(queries.peek_tasks().status, QueryStatus::Idle);

        let state = queries.tasks();
        assert!(!state.is_fetching);
        tokio::task::yield_now().await;
        assert_eq!(gateway.calls(GatewayOp::GetAll), 1);
    }

    #[tokio::test]
    async fn shutdown_cancels_in_flight_background_fetch() {
        let (gateway, queries) = setup(vec![]);
        gateway.pause();
        let _ = queries.tasks();
        tokio::task::yield_now().await;

        queries.shutdown();
        tokio::task::yield_now().await;
        gateway.resume();
        tokio::task::yield_now().await;
        assert!(queries.cache().get(&QueryKey::TaskList).is_none());
    }

    #[test]
    fn read_without_runtime_does_not_fetch() {
        let gateway = Arc::new(InMemoryTaskGateway::new());
        let queries = TaskQueries::new(gateway.clone(), CacheConfig::default());
        let state = queries.tasks();
        assert_eq!(state.status, QueryStatus::Idle);
        assert!(!state.is_fetching);
        assert_eq!(gateway.calls(GatewayOp::GetAll), 0);
    }
}
