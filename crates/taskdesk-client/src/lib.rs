//! # taskdesk-client
//!
//! Remote access to the task backend.
//!
//! - [`Transport`]: configured HTTP client that attaches JSON headers, the
//!   stored bearer token and a fixed timeout, and reacts to 401 responses
//! - [`TaskGateway`]: the five task operations as an async trait
//! - [`HttpTaskGateway`]: gateway over [`Transport`]
//! - [`InMemoryTaskGateway`]: in-process fake for exercising upper layers
//!
//! Errors are reported as [`ApiError`] and are never retried here.

#![deny(unsafe_code)]

pub mod errors;
pub mod gateway;
pub mod transport;

pub use errors::ApiError;
pub use gateway::http::HttpTaskGateway;
pub use gateway::memory::{GatewayOp, InMemoryTaskGateway};
pub use gateway::TaskGateway;
pub use transport::{AuthEvent, Transport, TransportConfig};
