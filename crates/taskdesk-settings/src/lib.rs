//! # taskdesk-settings
//!
//! Configuration for the taskdesk client.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`TaskdeskSettings::default()`]
//! 2. **User file**: `~/.taskdesk/settings.json` (deep-merged over defaults)
//! 3. **Environment variables**: `TASKDESK_*` overrides (highest priority)
//!
//! There is no global instance. Binaries load settings once at startup and
//! hand the relevant sections to the crates that need them.
//!
//! # Usage
//!
//! ```no_run
//! use taskdesk_settings::load_settings;
//!
//! let settings = load_settings().unwrap_or_default();
//! println!("API: {}", settings.api.base_url);
//! ```

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::*;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
