//! Cache timing.

use std::time::Duration;

use taskdesk_settings::CacheSettings;

/// Staleness windows per query kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheConfig {
    /// How long a fetched task list counts as fresh.
    pub list_stale_time: Duration,
    /// How long a fetched single task counts as fresh.
    pub detail_stale_time: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            list_stale_time: Duration::from_secs(5 * 60),
            detail_stale_time: Duration::ZERO,
        }
    }
}

impl CacheConfig {
    /// Build from loaded settings.
    pub fn from_settings(settings: &CacheSettings) -> Self {
        Self {
            list_stale_time: settings.list_stale_time(),
            detail_stale_time: settings.detail_stale_time(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_settings_defaults() {
        assert_eq!(
            CacheConfig::from_settings(&CacheSettings::default()),
            CacheConfig::default()
        );
    }
}
