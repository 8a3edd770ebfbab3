//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`TaskdeskSettings::default()`]
//! 2. If `~/.taskdesk/settings.json` exists, deep-merge user values over defaults
//! 3. Apply environment variable overrides (highest priority)
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::{Result, SettingsError};
use crate::types::TaskdeskSettings;

/// Backend base URL.
pub const ENV_BASE_URL: &str = "TASKDESK_API_BASE_URL";
/// Request timeout in milliseconds.
pub const ENV_TIMEOUT_MS: &str = "TASKDESK_TIMEOUT_MS";
/// List staleness window in milliseconds.
pub const ENV_LIST_STALE_MS: &str = "TASKDESK_LIST_STALE_MS";
/// Token file path.
pub const ENV_TOKEN_FILE: &str = "TASKDESK_TOKEN_FILE";
/// Log filter directive.
pub const ENV_LOG_LEVEL: &str = "TASKDESK_LOG_LEVEL";

/// Directory holding taskdesk's files (`~/.taskdesk`).
pub fn data_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".taskdesk")
}

/// Resolve the path to the settings file (`~/.taskdesk/settings.json`).
pub fn settings_path() -> PathBuf {
    data_dir().join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<TaskdeskSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults. If the file contains
/// invalid JSON, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<TaskdeskSettings> {
    let mut settings = load_file_layer(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Defaults merged with the file at `path`, without env overrides.
pub fn load_file_layer(path: &Path) -> Result<TaskdeskSettings> {
    let defaults = serde_json::to_value(TaskdeskSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    Ok(serde_json::from_value(merged)?)
}

/// Recursive deep merge of two JSON values.
///
/// - Objects are merged recursively (source overrides target per-key)
/// - Arrays and primitives are replaced entirely by source
/// - Null values in source are skipped (preserving target)
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply `TASKDESK_*` environment variable overrides to loaded settings.
pub fn apply_env_overrides(settings: &mut TaskdeskSettings) {
    apply_overrides_from(settings, |name| std::env::var(name).ok());
}

/// Apply overrides read through `lookup`.
///
/// - Strings must be non-empty
/// - Integers must parse and fall inside the accepted range
/// - Invalid values are ignored with a warning (fall back to file/default)
pub fn apply_overrides_from<F>(settings: &mut TaskdeskSettings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let read_string = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
    let read_u64 = |name: &str, min: u64, max: u64| {
        let val = lookup(name)?;
        let result = parse_u64_range(&val, min, max);
        if result.is_none() {
            tracing::warn!(key = name, value = %val, "invalid u64 env var, ignoring");
        }
        result
    };

    if let Some(v) = read_string(ENV_BASE_URL) {
        settings.api.base_url = v;
    }
    if let Some(v) = read_u64(ENV_TIMEOUT_MS, 1000, 60_000) {
        settings.api.timeout_ms = v;
    }
    if let Some(v) = read_u64(ENV_LIST_STALE_MS, 0, 86_400_000) {
        settings.cache.list_stale_ms = v;
    }
    if let Some(v) = read_string(ENV_TOKEN_FILE) {
        settings.auth.token_file = Some(v);
    }
    if let Some(v) = read_string(ENV_LOG_LEVEL) {
        settings.logging.level = v;
    }
}

/// Parse a string as a `u64` within an inclusive range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.trim().parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
