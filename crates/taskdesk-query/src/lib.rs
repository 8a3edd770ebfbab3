//! # taskdesk-query
//!
//! Server-state cache for tasks.
//!
//! - [`QueryCache`]: keyed entries with staleness, invalidation and
//!   per-fetch generations so that superseded fetches never overwrite newer
//!   data
//! - [`Mutation`]: pending/success/error state for one kind of write
//! - [`TaskQueries`]: the task list and by-id queries plus the create,
//!   update and delete mutations with their cache side effects
//!
//! Every state change bumps a version on a `watch` channel; consumers call
//! [`TaskQueries::subscribe`] and re-read on change.

#![deny(unsafe_code)]

pub mod cache;
pub mod config;
pub mod errors;
pub mod key;
pub mod mutation;
pub mod notify;
pub mod queries;
pub mod state;

pub use cache::{FetchTicket, QueryCache, QueryData};
pub use config::CacheConfig;
pub use errors::TaskError;
pub use key::QueryKey;
pub use mutation::Mutation;
pub use notify::ChangeNotifier;
pub use queries::TaskQueries;
pub use state::{MutationState, MutationStatus, QueryState, QueryStatus};
