//! # taskdesk-auth
//!
//! Client-side storage for the bearer token attached to API requests.
//!
//! - [`FileTokenStore`]: persists the token to `~/.taskdesk/token.json` with
//!   secure file permissions
//! - [`MemoryTokenStore`]: process-local store for tests and embedding
//!
//! Both implement [`TokenStore`], which the transport reads before every
//! request and clears when the backend answers 401.

#![deny(unsafe_code)]

pub mod errors;
pub mod storage;

pub use errors::AuthError;
pub use storage::{FileTokenStore, MemoryTokenStore, StoredToken, TokenStore, token_file_path};

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
