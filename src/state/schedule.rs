//! Break schedule configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::utils::duration::secs;

/// Idle check cadence used when the configured one is zero
pub const DEFAULT_IDLE_CHECK_INTERVAL: Duration = Duration::from_secs(5);

/// A recurring break: fires after `interval` of work and lasts `duration`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakConfig {
    #[serde(with = "secs", rename = "interval_secs")]
    pub interval: Duration,
    #[serde(with = "secs", rename = "duration_secs")]
    pub duration: Duration,
    pub enabled: bool,
}

impl BreakConfig {
    pub fn new(interval: Duration, duration: Duration) -> Self {
        Self {
            interval,
            duration,
            enabled: true,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// A break counts only when enabled and its interval can elapse
    pub fn is_active(&self) -> bool {
        self.enabled && !self.interval.is_zero()
    }
}

/// Long break definition; strict mode forbids skipping the break
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LongBreakConfig {
    #[serde(flatten)]
    pub base: BreakConfig,
    #[serde(default)]
    pub strict_mode: bool,
}

impl LongBreakConfig {
    pub fn new(interval: Duration, duration: Duration, strict_mode: bool) -> Self {
        Self {
            base: BreakConfig::new(interval, duration),
            strict_mode,
        }
    }
}

/// Idle-reset policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdleResetConfig {
    pub enabled: bool,
    #[serde(with = "secs", rename = "reset_after_secs")]
    pub reset_after: Duration,
    #[serde(with = "secs", rename = "check_interval_secs")]
    pub check_interval: Duration,
}

impl Default for IdleResetConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            reset_after: Duration::from_secs(5 * 60),
            check_interval: DEFAULT_IDLE_CHECK_INTERVAL,
        }
    }
}

/// Full schedule configuration, replaced wholesale on update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    pub short: BreakConfig,
    pub long: LongBreakConfig,
    #[serde(default)]
    pub idle: IdleResetConfig,
}

impl ScheduleConfig {
    /// Clamp values that would make the scheduler misbehave
    pub fn sanitized(mut self) -> Self {
        if self.idle.check_interval.is_zero() {
            warn!(
                "Idle check interval is zero, using {}s",
                DEFAULT_IDLE_CHECK_INTERVAL.as_secs()
            );
            self.idle.check_interval = DEFAULT_IDLE_CHECK_INTERVAL;
        }
        if self.short.enabled && self.short.interval.is_zero() {
            warn!("Short break interval is zero, short breaks disabled");
            self.short.enabled = false;
        }
        if self.long.base.enabled && self.long.base.interval.is_zero() {
            warn!("Long break interval is zero, long breaks disabled");
            self.long.base.enabled = false;
        }
        self
    }

    /// Configured length of a break state, zero for non-break states
    pub fn break_duration(&self, state: super::SessionState) -> Duration {
        match state {
            super::SessionState::ShortBreak => self.short.duration,
            super::SessionState::LongBreak => self.long.base.duration,
            _ => Duration::ZERO,
        }
    }

    /// Strict mode applies to long breaks only
    pub fn is_strict(&self, state: super::SessionState) -> bool {
        state == super::SessionState::LongBreak && self.long.strict_mode
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            short: BreakConfig::new(Duration::from_secs(15 * 60), Duration::from_secs(15)),
            long: LongBreakConfig::new(Duration::from_secs(50 * 60), Duration::from_secs(5 * 60), false),
            idle: IdleResetConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SessionState;

    #[test]
    fn sanitize_clamps_zero_idle_interval() {
        let mut config = ScheduleConfig::default();
        config.idle.check_interval = Duration::ZERO;
        let config = config.sanitized();
        assert_eq!(config.idle.check_interval, DEFAULT_IDLE_CHECK_INTERVAL);
    }

    #[test]
    fn sanitize_disables_zero_interval_breaks() {
        let mut config = ScheduleConfig::default();
        config.short.interval = Duration::ZERO;
        let config = config.sanitized();
        assert!(!config.short.enabled);
        assert!(config.long.base.enabled);
    }

    #[test]
    fn strict_only_for_long_breaks() {
        let mut config = ScheduleConfig::default();
        config.long.strict_mode = true;
        assert!(config.is_strict(SessionState::LongBreak));
        assert!(!config.is_strict(SessionState::ShortBreak));
    }

    #[test]
    fn deserializes_from_json_seconds() {
        let json = r#"{
            "short": { "interval_secs": 600, "duration_secs": 20, "enabled": true },
            "long": { "interval_secs": 3600, "duration_secs": 300, "enabled": false, "strict_mode": true }
        }"#;
        let config: ScheduleConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.short.interval, Duration::from_secs(600));
        assert!(!config.long.base.enabled);
        assert!(config.long.strict_mode);
        assert_eq!(config.idle, IdleResetConfig::default());
    }
}
