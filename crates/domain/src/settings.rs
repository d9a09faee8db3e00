//! Tunable delays, timeouts and workaround knobs.
//!
//! The print service has no readiness events, so these fixed values are the
//! only synchronisation available. All fields are milliseconds.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settle delays applied after commands the device processes asynchronously
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SdkTimings {
    pub after_init_ms: u64,
    pub after_commit_ms: u64,
    pub between_draws_ms: u64,
    pub after_draw_complete_ms: u64,
}

impl Default for SdkTimings {
    fn default() -> Self {
        Self {
            after_init_ms: 2000,
            after_commit_ms: 1000,
            between_draws_ms: 100,
            after_draw_complete_ms: 300,
        }
    }
}

impl SdkTimings {
    /// All delays zero; handy for tests that do not care about pacing
    pub fn immediate() -> Self {
        Self {
            after_init_ms: 0,
            after_commit_ms: 0,
            between_draws_ms: 0,
            after_draw_complete_ms: 0,
        }
    }

    pub fn after_init(&self) -> Duration {
        Duration::from_millis(self.after_init_ms)
    }

    pub fn after_commit(&self) -> Duration {
        Duration::from_millis(self.after_commit_ms)
    }

    pub fn between_draws(&self) -> Duration {
        Duration::from_millis(self.between_draws_ms)
    }

    pub fn after_draw_complete(&self) -> Duration {
        Duration::from_millis(self.after_draw_complete_ms)
    }
}

/// Per-call reply deadlines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallTimeouts {
    pub default_ms: u64,
    /// WiFi scan and connect
    pub long_ms: u64,
    /// `commitJob`, which may block while the label prints
    pub print_ms: u64,
}

impl Default for CallTimeouts {
    fn default() -> Self {
        Self {
            default_ms: 10_000,
            long_ms: 25_000,
            print_ms: 30_000,
        }
    }
}

impl CallTimeouts {
    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_ms)
    }

    pub fn long(&self) -> Duration {
        Duration::from_millis(self.long_ms)
    }

    pub fn print(&self) -> Duration {
        Duration::from_millis(self.print_ms)
    }
}

/// Busy-retry policy for `startJob`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    /// Wait before retry `n` is `n * base_interval_ms`
    pub base_interval_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_interval_ms: 1000,
        }
    }
}

impl RetrySettings {
    pub fn base_interval(&self) -> Duration {
        Duration::from_millis(self.base_interval_ms)
    }
}

/// Compensation for known vendor defects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkaroundSettings {
    /// Jobs with this many logical copies or fewer get a placeholder label
    pub single_copy_threshold: u32,
    /// Text drawn on the placeholder label
    pub placeholder_text: String,
    /// Replace rectangle graphs with four line draws
    pub split_rectangles: bool,
}

impl Default for WorkaroundSettings {
    fn default() -> Self {
        Self {
            single_copy_threshold: 1,
            placeholder_text: ".".to_string(),
            split_rectangles: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_measured_values() {
        let timings = SdkTimings::default();
        assert_eq!(timings.after_init(), Duration::from_secs(2));
        assert_eq!(timings.between_draws(), Duration::from_millis(100));

        let timeouts = CallTimeouts::default();
        assert_eq!(timeouts.default_timeout(), Duration::from_secs(10));
        assert_eq!(timeouts.long(), Duration::from_secs(25));

        assert_eq!(RetrySettings::default().max_attempts, 3);
        assert_eq!(WorkaroundSettings::default().single_copy_threshold, 1);
    }

    #[test]
    fn test_partial_override_keeps_other_defaults() {
        let timings: SdkTimings = serde_json::from_str(r#"{"after_init_ms": 500}"#).unwrap();
        assert_eq!(timings.after_init_ms, 500);
        assert_eq!(timings.after_commit_ms, 1000);
    }
}
