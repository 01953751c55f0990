//! Countdown state for work intervals and the running break

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ScheduleConfig;
use crate::utils::duration::millis;

/// Remaining work time before each break type, and time left in the current break
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdowns {
    #[serde(with = "millis", rename = "next_short_ms")]
    pub next_short: Duration,
    #[serde(with = "millis", rename = "next_long_ms")]
    pub next_long: Duration,
    /// Only meaningful while a break is running
    #[serde(with = "millis", rename = "remaining_ms")]
    pub remaining: Duration,
}

impl Countdowns {
    /// Fresh work countdowns for a configuration
    pub fn for_config(config: &ScheduleConfig) -> Self {
        let mut countdowns = Self::default();
        countdowns.reset_work(config);
        countdowns
    }

    /// Restart both work countdowns from their configured intervals
    pub fn reset_work(&mut self, config: &ScheduleConfig) {
        self.next_short = config.short.interval;
        self.next_long = config.long.base.interval;
    }

    /// Time until the nearest enabled break, zero when no break is enabled
    pub fn next_break(&self, config: &ScheduleConfig) -> Duration {
        match (config.short.is_active(), config.long.base.is_active()) {
            (true, true) => self.next_short.min(self.next_long),
            (true, false) => self.next_short,
            (false, true) => self.next_long,
            (false, false) => Duration::ZERO,
        }
    }

    /// Fraction of the work interval already elapsed, measured against the break that
    /// fires next; long wins ties
    pub fn work_progress(&self, config: &ScheduleConfig) -> f64 {
        let long = config.long.base;
        let short = config.short;
        let long_drives = long.is_active() && (!short.is_active() || self.next_long <= self.next_short);

        if long_drives {
            elapsed_fraction(long.interval, self.next_long)
        } else if short.is_active() {
            elapsed_fraction(short.interval, self.next_short)
        } else {
            0.0
        }
    }

    /// Fraction of the running break already elapsed, 1 for zero-length breaks
    pub fn break_progress(&self, duration: Duration) -> f64 {
        if duration.is_zero() {
            return 1.0;
        }
        elapsed_fraction(duration, self.remaining)
    }
}

fn elapsed_fraction(total: Duration, left: Duration) -> f64 {
    if total.is_zero() {
        return 1.0;
    }
    let done = total.saturating_sub(left).as_secs_f64() / total.as_secs_f64();
    done.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ScheduleConfig {
        ScheduleConfig::default()
    }

    #[test]
    fn next_break_picks_nearest_enabled() {
        let config = config();
        let mut countdowns = Countdowns::for_config(&config);
        assert_eq!(countdowns.next_break(&config), Duration::from_secs(15 * 60));

        countdowns.next_long = Duration::from_secs(60);
        assert_eq!(countdowns.next_break(&config), Duration::from_secs(60));

        let mut short_off = config;
        short_off.short.enabled = false;
        countdowns.next_long = Duration::from_secs(30 * 60);
        assert_eq!(countdowns.next_break(&short_off), Duration::from_secs(30 * 60));
    }

    #[test]
    fn next_break_is_zero_when_nothing_enabled() {
        let mut config = config();
        config.short.enabled = false;
        config.long.base.enabled = false;
        let countdowns = Countdowns::for_config(&config);
        assert_eq!(countdowns.next_break(&config), Duration::ZERO);
        assert_eq!(countdowns.work_progress(&config), 0.0);
    }

    #[test]
    fn work_progress_follows_the_nearer_break() {
        let config = config();
        let mut countdowns = Countdowns::for_config(&config);
        countdowns.next_short = Duration::from_secs(5 * 60);
        countdowns.next_long = Duration::from_secs(40 * 60);
        let progress = countdowns.work_progress(&config);
        assert!((progress - 10.0 / 15.0).abs() < 1e-9);

        countdowns.next_long = Duration::from_secs(60);
        let progress = countdowns.work_progress(&config);
        assert!((progress - 49.0 / 50.0).abs() < 1e-9);
    }

    #[test]
    fn break_progress_handles_zero_duration() {
        let countdowns = Countdowns::default();
        assert_eq!(countdowns.break_progress(Duration::ZERO), 1.0);
    }

    #[test]
    fn break_progress_is_clamped() {
        let countdowns = Countdowns {
            remaining: Duration::from_secs(30),
            ..Countdowns::default()
        };
        assert_eq!(countdowns.break_progress(Duration::from_secs(20)), 0.0);
        let half = countdowns.break_progress(Duration::from_secs(60));
        assert!((half - 0.5).abs() < 1e-9);
    }
}
