//! Application state shared by the HTTP surface

use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};
use chrono::{DateTime, Utc};
use tracing::info;

use super::{BreakKind, ScheduleConfig, SkipOutcome, StatusSnapshot, TimeKeeper};
use crate::tasks::PauseTimer;

/// Shell around the [`TimeKeeper`]: command bookkeeping for the HTTP API
#[derive(Debug)]
pub struct AppState {
    pub keeper: Arc<TimeKeeper>,
    pub pause_timer: PauseTimer,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Mutex<Option<String>>,
    pub last_action_time: Mutex<Option<DateTime<Utc>>>,
}

impl AppState {
    pub fn new(keeper: Arc<TimeKeeper>, port: u16, host: String) -> Self {
        Self {
            keeper,
            pause_timer: PauseTimer::new(),
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
        }
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Run a keeper command and return the resulting snapshot
    fn command<F>(&self, action: &str, apply: F) -> StatusSnapshot
    where
        F: FnOnce(&Arc<TimeKeeper>),
    {
        info!("Command: {}", action);
        apply(&self.keeper);
        self.record_action(action);
        self.keeper.snapshot()
    }

    pub fn start(&self) -> StatusSnapshot {
        self.command("start", |keeper| keeper.start())
    }

    pub fn stop(&self) -> StatusSnapshot {
        self.command("stop", |keeper| self.pause_timer.cancel_with(|| keeper.stop()))
    }

    pub fn pause(&self) -> StatusSnapshot {
        self.command("pause", |keeper| self.pause_timer.cancel_with(|| keeper.pause()))
    }

    pub fn resume(&self) -> StatusSnapshot {
        self.command("resume", |keeper| self.pause_timer.cancel_with(|| keeper.resume()))
    }

    /// Pause now and resume automatically after `duration`
    pub fn pause_for(&self, duration: Duration) -> StatusSnapshot {
        self.command("pause-for", |keeper| self.pause_timer.pause_for(keeper, duration))
    }

    /// Skip the current break; strict long breaks are refused
    pub fn skip_break(&self) -> (SkipOutcome, StatusSnapshot) {
        let mut outcome = SkipOutcome::Ignored;
        let snapshot = self.command("skip", |keeper| outcome = keeper.skip_unless_strict());
        (outcome, snapshot)
    }

    pub fn force_break(&self, kind: BreakKind) -> StatusSnapshot {
        let action = match kind {
            BreakKind::Short => "force-short",
            BreakKind::Long => "force-long",
        };
        self.command(action, |keeper| keeper.force_break(kind))
    }

    pub fn reset_for_idle(&self) -> StatusSnapshot {
        self.command("idle-reset", |keeper| keeper.reset_for_idle())
    }

    pub fn update_config(&self, config: ScheduleConfig) -> StatusSnapshot {
        self.command("config", |keeper| keeper.update_config(config))
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
