//! Observable query and mutation state.

use taskdesk_client::ApiError;

/// Lifecycle of a query entry.
///
/// `Success` and `Error` go back to `Pending` when the entry is refetched;
/// cached data stays readable meanwhile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum QueryStatus {
    /// Never fetched (or disabled).
    #[default]
    Idle,
    /// A fetch is in flight.
    Pending,
    /// The last fetch succeeded.
    Success,
    /// The last fetch failed.
    Error,
}

/// Snapshot of one query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryState<T> {
    /// Lifecycle status.
    pub status: QueryStatus,
    /// Last successfully fetched data, kept through refetches and errors.
    pub data: Option<T>,
    /// Error of the last fetch, cleared by the next success.
    pub error: Option<ApiError>,
    /// Whether a fetch is in flight.
    pub is_fetching: bool,
    /// Whether the next read would refetch.
    pub is_stale: bool,
}

impl<T> QueryState<T> {
    /// State of a query that has never run.
    pub fn idle() -> Self {
        Self {
            status: QueryStatus::Idle,
            data: None,
            error: None,
            is_fetching: false,
            is_stale: true,
        }
    }

    /// Status is [`QueryStatus::Pending`].
    pub fn is_pending(&self) -> bool {
        self.status == QueryStatus::Pending
    }

    /// Status is [`QueryStatus::Success`].
    pub fn is_success(&self) -> bool {
        self.status == QueryStatus::Success
    }

    /// Status is [`QueryStatus::Error`].
    pub fn is_error(&self) -> bool {
        self.status == QueryStatus::Error
    }

    /// Convert the data, keeping status flags.
    pub fn and_then_data<U>(self, f: impl FnOnce(T) -> Option<U>) -> QueryState<U> {
        QueryState {
            status: self.status,
            data: self.data.and_then(f),
            error: self.error,
            is_fetching: self.is_fetching,
            is_stale: self.is_stale,
        }
    }
}

/// Lifecycle of a mutation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MutationStatus {
    /// Not run since creation or the last reset.
    #[default]
    Idle,
    /// A call is in flight.
    Pending,
    /// The last call succeeded.
    Success,
    /// The last call failed.
    Error,
}

/// Snapshot of one mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MutationState<T> {
    /// Lifecycle status.
    pub status: MutationStatus,
    /// Result of the last successful call.
    pub data: Option<T>,
    /// Error of the last failed call.
    pub error: Option<ApiError>,
}

impl<T> Default for MutationState<T> {
    fn default() -> Self {
        Self {
            status: MutationStatus::Idle,
            data: None,
            error: None,
        }
    }
}

impl<T> MutationState<T> {
    /// Status is [`MutationStatus::Pending`].
    pub fn is_pending(&self) -> bool {
        self.status == MutationStatus::Pending
    }

    /// Status is [`MutationStatus::Success`].
    pub fn is_success(&self) -> bool {
        self.status == MutationStatus::Success
    }

    /// Status is [`MutationStatus::Error`].
    pub fn is_error(&self) -> bool {
        self.status == MutationStatus::Error
    }
}
