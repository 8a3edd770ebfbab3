//! Keyed query cache.
//!
//! Each entry tracks its data, last error, status and freshness. Fetches are
//! bracketed by [`QueryCache::begin_fetch`] and [`QueryCache::finish_fetch`]:
//! beginning a fetch hands out a [`FetchTicket`] carrying a fresh generation,
//! and only the ticket of the newest fetch may write the entry. A ticket also
//! remembers the entry's invalidation count so an invalidation that lands
//! mid-fetch still marks the entry stale once the fetch completes.
//!
//! The lock is never held across an `.await`; callers do their I/O between
//! the begin and finish calls.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, trace};

use taskdesk_client::ApiError;
use taskdesk_core::Task;

use crate::key::QueryKey;
use crate::notify::ChangeNotifier;
use crate::state::{QueryState, QueryStatus};

/// Cached payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryData {
    /// Payload of [`QueryKey::TaskList`].
    TaskList(Vec<Task>),
    /// Payload of [`QueryKey::Task`].
    Task(Task),
}

impl QueryData {
    /// The task list, if this is one.
    pub fn into_tasks(self) -> Option<Vec<Task>> {
        match self {
            Self::TaskList(tasks) => Some(tasks),
            Self::Task(_) => None,
        }
    }

    /// The single task, if this is one.
    pub fn into_task(self) -> Option<Task> {
        match self {
            Self::Task(task) => Some(task),
            Self::TaskList(_) => None,
        }
    }
}

/// Proof of a started fetch. Pass it back to [`QueryCache::finish_fetch`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FetchTicket {
    /// Key being fetched.
    pub key: QueryKey,
    generation: u64,
    invalidations: u64,
}

#[derive(Debug, Default)]
struct QueryEntry {
    data: Option<QueryData>,
    error: Option<ApiError>,
    status: QueryStatus,
    is_fetching: bool,
    data_updated_at: Option<Instant>,
    invalidated: bool,
    invalidations: u64,
    generation: u64,
}

impl QueryEntry {
    fn is_stale(&self, stale_time: Duration) -> bool {
        if self.data.is_none() || self.invalidated {
            return true;
        }
        self.data_updated_at
            .is_none_or(|at| at.elapsed() >= stale_time)
    }

    fn settled_status(&self) -> QueryStatus {
        if self.error.is_some() {
            QueryStatus::Error
        } else if self.data.is_some() {
            QueryStatus::Success
        } else {
            QueryStatus::Idle
        }
    }
}

#[derive(Debug, Default)]
struct CacheInner {
    entries: HashMap<QueryKey, QueryEntry>,
    next_generation: u64,
}

/// Shared store of query entries.
#[derive(Debug, Default)]
pub struct QueryCache {
    inner: Mutex<CacheInner>,
    notifier: ChangeNotifier,
}

impl QueryCache {
    /// Empty cache with its own notifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifier bumped on every cache change. Share it with anything whose
    /// state should wake the same subscribers.
    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    /// Receiver woken on every change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.notifier.subscribe()
    }

    /// Current data for a key.
    pub fn get(&self, key: &QueryKey) -> Option<QueryData> {
        self.inner
            .lock()
            .entries
            .get(key)
            .and_then(|entry| entry.data.clone())
    }

    /// Snapshot of a key. Unknown keys read as idle.
    pub fn state(&self, key: &QueryKey, stale_time: Duration) -> QueryState<QueryData> {
        let inner = self.inner.lock();
        match inner.entries.get(key) {
            Some(entry) => QueryState {
                status: entry.status,
                data: entry.data.clone(),
                error: entry.error.clone(),
                is_fetching: entry.is_fetching,
                is_stale: entry.is_stale(stale_time),
            },
            None => QueryState::idle(),
        }
    }

    /// Whether a read of `key` should refetch.
    pub fn is_stale(&self, key: &QueryKey, stale_time: Duration) -> bool {
        self.inner
            .lock()
            .entries
            .get(key)
            .is_none_or(|entry| entry.is_stale(stale_time))
    }

    /// Mark `key` as fetching and return the ticket that owns the entry.
    ///
    /// Any fetch already in flight for the key is superseded.
    pub fn begin_fetch(&self, key: QueryKey) -> FetchTicket {
        let ticket = {
            let mut inner = self.inner.lock();
            Self::start(&mut inner, key)
        };
        trace!(%key, generation = ticket.generation, "fetch started");
        self.notifier.notify();
        ticket
    }

    /// Like [`begin_fetch`](Self::begin_fetch), but only when the entry is
    /// stale and no fetch is already in flight.
    pub fn begin_fetch_if_stale(&self, key: QueryKey, stale_time: Duration) -> Option<FetchTicket> {
        let ticket = {
            let mut inner = self.inner.lock();
            let due = inner
                .entries
                .get(&key)
                .is_none_or(|entry| !entry.is_fetching && entry.is_stale(stale_time));
            if !due {
                return None;
            }
            Self::start(&mut inner, key)
        };
        trace!(%key, generation = ticket.generation, "stale fetch started");
        self.notifier.notify();
        Some(ticket)
    }

    fn start(inner: &mut CacheInner, key: QueryKey) -> FetchTicket {
        inner.next_generation += 1;
        let generation = inner.next_generation;
        let entry = inner.entries.entry(key).or_default();
        entry.generation = generation;
        entry.is_fetching = true;
        entry.status = QueryStatus::Pending;
        FetchTicket {
            key,
            generation,
            invalidations: entry.invalidations,
        }
    }

    /// Record a fetch outcome. Returns `false` if the ticket was superseded
    /// or the entry removed, in which case nothing is written.
    pub fn finish_fetch(&self, ticket: FetchTicket, result: Result<QueryData, ApiError>) -> bool {
        {
            let mut inner = self.inner.lock();
            let Some(entry) = inner
                .entries
                .get_mut(&ticket.key)
                .filter(|entry| entry.generation == ticket.generation)
            else {
                debug!(key = %ticket.key, "discarding superseded fetch result");
                return false;
            };

            entry.is_fetching = false;
            match result {
                Ok(data) => {
                    entry.data = Some(data);
                    entry.error = None;
                    entry.status = QueryStatus::Success;
                    entry.data_updated_at = Some(Instant::now());
                    entry.invalidated = entry.invalidations != ticket.invalidations;
                }
                Err(error) => {
                    entry.error = Some(error);
                    entry.status = QueryStatus::Error;
                }
            }
        }
        self.notifier.notify();
        true
    }

    /// Drop a fetch that will never finish (its future was dropped).
    pub fn abandon_fetch(&self, ticket: FetchTicket) {
        {
            let mut inner = self.inner.lock();
            let Some(entry) = inner
                .entries
                .get_mut(&ticket.key)
                .filter(|entry| entry.generation == ticket.generation && entry.is_fetching)
            else {
                return;
            };
            entry.is_fetching = false;
            entry.status = entry.settled_status();
        }
        debug!(key = %ticket.key, "fetch abandoned");
        self.notifier.notify();
    }

    /// Write data directly, as if a fetch had just succeeded.
    pub fn set_query_data(&self, key: QueryKey, data: QueryData) {
        {
            let mut inner = self.inner.lock();
            let entry = inner.entries.entry(key).or_default();
            entry.data = Some(data);
            entry.error = None;
            entry.data_updated_at = Some(Instant::now());
            entry.invalidated = false;
            if !entry.is_fetching {
                entry.status = QueryStatus::Success;
            }
        }
        self.notifier.notify();
    }

    /// Mark `key` stale so its next read refetches. Unknown keys are ignored.
    pub fn invalidate(&self, key: &QueryKey) {
        {
            let mut inner = self.inner.lock();
            let Some(entry) = inner.entries.get_mut(key) else {
                return;
            };
            entry.invalidated = true;
            entry.invalidations += 1;
        }
        debug!(%key, "query invalidated");
        self.notifier.notify();
    }

    /// Purge `key`. An in-flight fetch for it will not write back.
    pub fn remove(&self, key: &QueryKey) {
        let removed = self.inner.lock().entries.remove(key).is_some();
        if removed {
            debug!(%key, "query removed");
            self.notifier.notify();
        }
    }

    /// Purge every entry.
    pub fn clear(&self) {
        self.inner.lock().entries.clear();
        self.notifier.notify();
    }

    /// Wrap a started fetch so that dropping the wrapper abandons it.
    pub(crate) fn guarded_fetch(&self, ticket: FetchTicket) -> FetchGuard<'_> {
        FetchGuard {
            cache: self,
            ticket: Some(ticket),
        }
    }
}

/// Abandons its fetch on drop unless [`finish`](FetchGuard::finish) ran.
pub(crate) struct FetchGuard<'a> {
    cache: &'a QueryCache,
    ticket: Option<FetchTicket>,
}

impl FetchGuard<'_> {
    pub(crate) fn finish(mut self, result: Result<QueryData, ApiError>) -> bool {
        match self.ticket.take() {
            Some(ticket) => self.cache.finish_fetch(ticket, result),
            None => false,
        }
    }
}

impl Drop for FetchGuard<'_> {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            self.cache.abandon_fetch(ticket);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use taskdesk_core::TaskId;

    const WINDOW: Duration = Duration::from_secs(300);

    fn task(id: u64, title: &str) -> Task {
        Task {
            id: TaskId::new(id),
            title: title.into(),
            category: "work".into(),
            created_at: None,
            updated_at: None,
        }
    }

    fn list(titles: &[&str]) -> QueryData {
        QueryData::TaskList(
            titles
                .iter()
                .zip(1..)
                .map(|(title, id)| task(id, title))
                .collect(),
        )
    }

    #[test]
    fn unknown_key_is_idle_and_stale() {
        let cache = QueryCache::new();
        let state = cache.state(&QueryKey::TaskList, WINDOW);
        assert_eq!(state.status, QueryStatus::Idle);
        assert!(state.is_stale);
        assert!(cache.is_stale(&QueryKey::TaskList, WINDOW));
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_lifecycle() {
        let cache = QueryCache::new();
        let ticket = cache.begin_fetch(QueryKey::TaskList);

        let state = cache.state(&QueryKey::TaskList, WINDOW);
        assert!(state.is_pending());
        assert!(state.is_fetching);

        assert!(cache.finish_fetch(ticket, Ok(list(&["a"]))));
        let state = cache.state(&QueryKey::TaskList, WINDOW);
        assert!(state.is_success());
        assert!(!state.is_stale);
        assert_eq!(state.data, Some(list(&["a"])));
    }

    #[tokio::test(start_paused = true)]
    async fn entry_goes_stale_after_window() {
        let cache = QueryCache::new();
        let ticket = cache.begin_fetch(QueryKey::TaskList);
        let _ = cache.finish_fetch(ticket, Ok(list(&["a"])));

        tokio::time::advance(WINDOW - Duration::from_secs(1)).await;
        assert!(!cache.is_stale(&QueryKey::TaskList, WINDOW));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(cache.is_stale(&QueryKey::TaskList, WINDOW));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_window_is_always_stale() {
        let cache = QueryCache::new();
        let key = QueryKey::Task(TaskId::new(1));
        let ticket = cache.begin_fetch(key);
        let _ = cache.finish_fetch(ticket, Ok(QueryData::Task(task(1, "a"))));
        assert!(cache.is_stale(&key, Duration::ZERO));
    }

    #[test]
    fn refetch_keeps_data_while_pending() {
        let cache = QueryCache::new();
        let first = cache.begin_fetch(QueryKey::TaskList);
        let _ = cache.finish_fetch(first, Ok(list(&["a"])));

        let _second = cache.begin_fetch(QueryKey::TaskList);
        let state = cache.state(&QueryKey::TaskList, WINDOW);
        assert!(state.is_pending());
        assert_eq!(state.data, Some(list(&["a"])));
    }

    #[test]
    fn error_keeps_data_and_next_success_clears_error() {
        let cache = QueryCache::new();
        let t = cache.begin_fetch(QueryKey::TaskList);
        let _ = cache.finish_fetch(t, Ok(list(&["a"])));

        let t = cache.begin_fetch(QueryKey::TaskList);
        let _ = cache.finish_fetch(t, Err(ApiError::from_status(500, "")));
        let state = cache.state(&QueryKey::TaskList, WINDOW);
        assert!(state.is_error());
        assert_eq!(state.data, Some(list(&["a"])));
        assert_eq!(state.error.and_then(|e| e.status()), Some(500));

        let t = cache.begin_fetch(QueryKey::TaskList);
        let _ = cache.finish_fetch(t, Ok(list(&["b"])));
        let state = cache.state(&QueryKey::TaskList, WINDOW);
        assert!(state.is_success());
        assert!(state.error.is_none());
    }

    #[test]
    fn superseded_fetch_does_not_write() {
        let cache = QueryCache::new();
        let old = cache.begin_fetch(QueryKey::TaskList);
        let new = cache.begin_fetch(QueryKey::TaskList);

        assert!(cache.finish_fetch(new, Ok(list(&["new"]))));
        assert!(!cache.finish_fetch(old, Ok(list(&["old"]))));
        assert_eq!(cache.get(&QueryKey::TaskList), Some(list(&["new"])));
    }

    #[test]
    fn superseded_fetch_finishing_first_leaves_entry_fetching() {
        let cache = QueryCache::new();
        let old = cache.begin_fetch(QueryKey::TaskList);
        let _new = cache.begin_fetch(QueryKey::TaskList);

        assert!(!cache.finish_fetch(old, Ok(list(&["old"]))));
        let state = cache.state(&QueryKey::TaskList, WINDOW);
        assert!(state.is_fetching);
        assert!(state.data.is_none());
    }

    #[test]
    fn invalidation_during_fetch_keeps_entry_stale() {
        let cache = QueryCache::new();
        let t = cache.begin_fetch(QueryKey::TaskList);
        cache.invalidate(&QueryKey::TaskList);
        let _ = cache.finish_fetch(t, Ok(list(&["a"])));
        assert!(cache.is_stale(&QueryKey::TaskList, WINDOW));
    }

    #[test]
    fn invalidation_before_fetch_is_cleared_by_it() {
        let cache = QueryCache::new();
        let t = cache.begin_fetch(QueryKey::TaskList);
        let _ = cache.finish_fetch(t, Ok(list(&["a"])));
        cache.invalidate(&QueryKey::TaskList);
        assert!(cache.is_stale(&QueryKey::TaskList, WINDOW));

        let t = cache.begin_fetch(QueryKey::TaskList);
        let _ = cache.finish_fetch(t, Ok(list(&["a"])));
        assert!(!cache.is_stale(&QueryKey::TaskList, WINDOW));
    }

    #[test]
    fn invalidate_is_exact_key() {
        let cache = QueryCache::new();
        let key = QueryKey::Task(TaskId::new(1));
        cache.set_query_data(key, QueryData::Task(task(1, "a")));
        cache.invalidate(&QueryKey::TaskList);
        assert!(!cache.is_stale(&key, WINDOW));
    }

    #[test]
    fn begin_if_stale_skips_fresh_and_in_flight() {
        let cache = QueryCache::new();
        let t = cache
            .begin_fetch_if_stale(QueryKey::TaskList, WINDOW)
            .unwrap();
        assert!(cache.begin_fetch_if_stale(QueryKey::TaskList, WINDOW).is_none());

        let _ = cache.finish_fetch(t, Ok(list(&["a"])));
        assert!(cache.begin_fetch_if_stale(QueryKey::TaskList, WINDOW).is_none());

        cache.invalidate(&QueryKey::TaskList);
        assert!(cache.begin_fetch_if_stale(QueryKey::TaskList, WINDOW).is_some());
    }

    #[test]
    fn removed_entry_is_not_resurrected() {
        let cache = QueryCache::new();
        let key = QueryKey::Task(TaskId::new(1));
        let t = cache.begin_fetch(key);
        cache.remove(&key);
        assert!(!cache.finish_fetch(t, Ok(QueryData::Task(task(1, "a")))));
        assert!(cache.get(&key).is_none());
    }

    #[test]
    fn dropped_guard_abandons_fetch() {
        let cache = QueryCache::new();
        let t = cache.begin_fetch(QueryKey::TaskList);
        drop(cache.guarded_fetch(t));
        let state = cache.state(&QueryKey::TaskList, WINDOW);
        assert!(!state.is_fetching);
        assert_eq!(state.status, QueryStatus::Idle);
    }

    #[test]
    fn finished_guard_writes() {
        let cache = QueryCache::new();
        let t = cache.begin_fetch(QueryKey::TaskList);
        assert!(cache.guarded_fetch(t).finish(Ok(list(&["a"]))));
        assert!(cache.state(&QueryKey::TaskList, WINDOW).is_success());
    }

    #[test]
    fn changes_bump_version() {
        let cache = QueryCache::new();
        let before = cache.notifier().version();
        cache.set_query_data(QueryKey::TaskList, list(&["a"]));
        cache.invalidate(&QueryKey::TaskList);
        cache.clear();
        assert_eq!(cache.notifier().version(), before + 3);
    }
}
