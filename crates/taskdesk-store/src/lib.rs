//! # taskdesk-store
//!
//! Single entry point for task consumers. [`TaskStore`] exposes the cached
//! task list with its derived views, aggregated loading and error flags, and
//! actions that run a mutation and then refresh the list.

#![deny(unsafe_code)]

pub mod store;

pub use store::{TaskStore, TaskStoreState};
