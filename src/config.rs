//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};
use clap::Parser;

use crate::{
    error::AppError,
    state::{BreakConfig, IdleResetConfig, LongBreakConfig, ScheduleConfig},
};

/// CLI argument parsing structure
#[derive(Parser, Debug, Clone)]
#[command(name = "eagle-eye")]
#[command(about = "A break-reminder scheduler that keeps your eyes rested")]
#[command(version)]
pub struct Config {
    /// Port to bind the control API to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Scheduler tick interval in milliseconds
    #[arg(long, default_value = "1000")]
    pub tick_ms: u64,

    /// Minutes of work before a short break
    #[arg(long, default_value = "15")]
    pub short_interval_min: u64,

    /// Short break length in seconds
    #[arg(long, default_value = "15")]
    pub short_duration_sec: u64,

    /// Minutes of work before a long break
    #[arg(long, default_value = "50")]
    pub long_interval_min: u64,

    /// Long break length in minutes
    #[arg(long, default_value = "5")]
    pub long_duration_min: u64,

    /// Disable short breaks
    #[arg(long)]
    pub no_short: bool,

    /// Disable long breaks
    #[arg(long)]
    pub no_long: bool,

    /// Long breaks cannot be skipped
    #[arg(long)]
    pub strict: bool,

    /// Restart work countdowns after the user has been idle
    #[arg(long)]
    pub idle_reset: bool,

    /// Minutes of inactivity that count as a rest
    #[arg(long, default_value = "5")]
    pub idle_after_min: u64,

    /// Seconds between idle checks
    #[arg(long, default_value = "5")]
    pub idle_check_sec: u64,

    /// Append events as JSON lines to this file
    #[arg(long)]
    pub event_log: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Build the schedule handed to the time keeper
    pub fn schedule(&self) -> Result<ScheduleConfig, AppError> {
        if self.no_short && self.no_long {
            return Err(AppError::Config("both short and long breaks are disabled".to_string()));
        }

        let mut short = BreakConfig::new(
            minutes("short-interval-min", self.short_interval_min)?,
            Duration::from_secs(self.short_duration_sec),
        );
        short.enabled = !self.no_short;

        let mut long = LongBreakConfig::new(
            minutes("long-interval-min", self.long_interval_min)?,
            minutes("long-duration-min", self.long_duration_min)?,
            self.strict,
        );
        long.base.enabled = !self.no_long;

        Ok(ScheduleConfig {
            short,
            long,
            idle: IdleResetConfig {
                enabled: self.idle_reset,
                reset_after: minutes("idle-after-min", self.idle_after_min)?,
                check_interval: Duration::from_secs(self.idle_check_sec),
            },
        })
    }
}

fn minutes(flag: &str, value: u64) -> Result<Duration, AppError> {
    value
        .checked_mul(60)
        .map(Duration::from_secs)
        .ok_or_else(|| AppError::Config(format!("--{} {} is too large", flag, value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_desktop_app() {
        let config = Config::try_parse_from(["eagle-eye"]).unwrap();
        let schedule = config.schedule().unwrap();
        assert_eq!(schedule, ScheduleConfig::default());
        assert_eq!(config.tick_interval(), Duration::from_secs(1));
    }

    #[test]
    fn flags_shape_the_schedule() {
        let config = Config::try_parse_from([
            "eagle-eye",
            "--no-short",
            "--strict",
            "--idle-reset",
            "--long-interval-min",
            "45",
        ])
        .unwrap();
        let schedule = config.schedule().unwrap();
        assert!(!schedule.short.enabled);
        assert!(schedule.long.strict_mode);
        assert!(schedule.idle.enabled);
        assert_eq!(schedule.long.base.interval, Duration::from_secs(45 * 60));
    }

    #[test]
    fn rejects_minutes_that_overflow() {
        let config =
            Config::try_parse_from(["eagle-eye", "--long-interval-min", "18446744073709551615"])
                .unwrap();
        let err = config.schedule().unwrap_err();
        assert!(err.to_string().contains("long-interval-min"));
    }

    #[test]
    fn rejects_schedule_without_breaks() {
        let config = Config::try_parse_from(["eagle-eye", "--no-short", "--no-long"]).unwrap();
        assert!(config.schedule().is_err());
    }
}
