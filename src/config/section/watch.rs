//! `[watch]` section configuration.
//!
//! ```toml
//! [watch]
//! debounce_ms = 300   # quiet period before a burst of saves is reloaded
//! retry_ms = 2000     # re-attach interval after the directory was lost
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub debounce_ms: u64,
    pub retry_ms: u64,
}

impl WatchConfig {
    pub const DEBOUNCE_MS: FieldPath = FieldPath::new("watch.debounce_ms");
    pub const RETRY_MS: FieldPath = FieldPath::new("watch.retry_ms");

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn retry(&self) -> Duration {
        Duration::from_millis(self.retry_ms)
    }

    pub(crate) fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.debounce_ms == 0 {
            diag.error(Self::DEBOUNCE_MS, "must be greater than 0");
        }
        if self.retry_ms == 0 {
            diag.error(Self::RETRY_MS, "must be greater than 0");
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            retry_ms: 2000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_watch_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.watch.debounce(), Duration::from_millis(300));
        assert_eq!(config.watch.retry(), Duration::from_secs(2));
    }

    #[test]
    fn test_zero_durations_rejected() {
        let watch = WatchConfig {
            debounce_ms: 0,
            retry_ms: 0,
        };
        let mut diag = ConfigDiagnostics::new();
        watch.validate(&mut diag);
        let report = diag.into_result().unwrap_err().to_string();
        assert!(report.contains("(2 problems)"));
        assert!(report.contains(WatchConfig::DEBOUNCE_MS.as_str()));
        assert!(report.contains(WatchConfig::RETRY_MS.as_str()));
    }
}
