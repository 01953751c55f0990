//! Break scheduling state machine.
//!
//! `BreakMachine` holds no locks and spawns nothing: every command and every tick
//! returns the events it produced, and the caller decides how to deliver them.
//! [`TimeKeeper`](super::TimeKeeper) wraps it in a single mutex together with the
//! broadcaster so that decisions and emissions are one critical section.
//!
//! ```text
//! Work --(countdown hits zero / force)--> ShortBreak | LongBreak
//! ShortBreak | LongBreak --(remaining hits zero / skip)--> Work
//! any --(pause)--> Paused --(resume)--> previous state
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::{BreakKind, Countdowns, ScheduleConfig, SessionState};
use crate::events::Event;
use crate::services::IdleError;

/// Tick interval used when a zero interval is requested
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Point-in-time view of the scheduler for status displays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub state: SessionState,
    pub previous_state: SessionState,
    pub countdowns: Countdowns,
    #[serde(with = "crate::utils::duration::millis", rename = "next_break_ms")]
    pub next_break: Duration,
    pub work_progress: f64,
    pub strict_mode: bool,
    pub idle_reset_enabled: bool,
}

#[derive(Debug, Clone)]
pub struct BreakMachine {
    config: ScheduleConfig,
    tick_interval: Duration,
    state: SessionState,
    previous_state: SessionState,
    countdowns: Countdowns,
    last_idle_check: Option<Instant>,
    last_progress_sent: Option<Instant>,
}

impl BreakMachine {
    pub fn new(config: ScheduleConfig, tick_interval: Duration) -> Self {
        let config = config.sanitized();
        let tick_interval = if tick_interval.is_zero() {
            warn!("Tick interval is zero, using {:?}", DEFAULT_TICK_INTERVAL);
            DEFAULT_TICK_INTERVAL
        } else {
            tick_interval
        };

        Self {
            countdowns: Countdowns::for_config(&config),
            config,
            tick_interval,
            state: SessionState::Work,
            previous_state: SessionState::Work,
            last_idle_check: None,
            last_progress_sent: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn previous_state(&self) -> SessionState {
        self.previous_state
    }

    pub fn countdowns(&self) -> Countdowns {
        self.countdowns
    }

    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub fn is_paused(&self) -> bool {
        self.state == SessionState::Paused
    }

    /// Current break state, looking through a pause
    fn effective_state(&self) -> SessionState {
        if self.is_paused() {
            self.previous_state
        } else {
            self.state
        }
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            state: self.state,
            previous_state: self.previous_state,
            countdowns: self.countdowns,
            next_break: self.countdowns.next_break(&self.config),
            work_progress: self.countdowns.work_progress(&self.config),
            strict_mode: self.config.is_strict(self.effective_state()),
            idle_reset_enabled: self.config.idle.enabled,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a fresh work session
    pub fn start(&mut self) -> Event {
        self.state = SessionState::Work;
        self.previous_state = SessionState::Work;
        self.countdowns.remaining = Duration::ZERO;
        self.countdowns.reset_work(&self.config);
        self.last_idle_check = None;
        self.last_progress_sent = None;
        Event::state_change(SessionState::Work)
    }

    pub fn pause(&mut self) -> Option<Event> {
        if self.is_paused() {
            debug!("Pause ignored, already paused");
            return None;
        }
        self.previous_state = self.state;
        self.state = SessionState::Paused;
        Some(Event::state_change(SessionState::Paused))
    }

    pub fn resume(&mut self) -> Option<Event> {
        if !self.is_paused() {
            debug!("Resume ignored, not paused");
            return None;
        }
        self.state = self.previous_state;
        Some(
            Event::state_change(self.state)
                .with_remaining(self.visible_remaining())
                .with_strict_mode(self.config.is_strict(self.state)),
        )
    }

    /// Replace the configuration and restart the work countdowns.
    ///
    /// A running break keeps its `remaining`. Idle reset follows the new
    /// configuration, even if it had been disabled as unsupported.
    pub fn update_config(&mut self, config: ScheduleConfig) {
        self.config = config.sanitized();
        self.countdowns.reset_work(&self.config);
        self.last_progress_sent = None;
        info!(
            "Schedule updated: short={}s/{}s ({}), long={}s/{}s ({}), idle reset {}",
            self.config.short.interval.as_secs(),
            self.config.short.duration.as_secs(),
            enabled_label(self.config.short.enabled),
            self.config.long.base.interval.as_secs(),
            self.config.long.base.duration.as_secs(),
            enabled_label(self.config.long.base.enabled),
            enabled_label(self.config.idle.enabled),
        );
    }

    pub fn skip_break(&mut self) -> Option<Event> {
        if !self.state.is_break() {
            debug!("Skip ignored in state {}", self.state);
            return None;
        }
        info!("Skipping {}", self.state);
        Some(self.return_to_work())
    }

    pub fn force_break(&mut self, kind: BreakKind) -> Option<Event> {
        if self.state != SessionState::Work {
            debug!("Force {:?} break ignored in state {}", kind, self.state);
            return None;
        }
        info!("Forcing {:?} break", kind);
        Some(self.enter_break(kind))
    }

    pub fn reset_for_idle(&mut self) {
        self.countdowns.reset_work(&self.config);
    }

    // ── Idle handling ────────────────────────────────────────────────

    /// Whether an idle query should run for the tick at `now`. Claims the slot.
    pub fn idle_check_due(&mut self, now: Instant) -> bool {
        if self.state != SessionState::Work || !self.config.idle.enabled {
            return false;
        }
        if let Some(last) = self.last_idle_check {
            if now.saturating_duration_since(last) < self.config.idle.check_interval {
                return false;
            }
        }
        self.last_idle_check = Some(now);
        true
    }

    /// Fold an idle query result into the session
    pub fn apply_idle_result(&mut self, result: Result<Duration, IdleError>) -> Option<Event> {
        if self.state != SessionState::Work || !self.config.idle.enabled {
            debug!("Discarding stale idle result");
            return None;
        }

        match result {
            Err(IdleError::Unsupported) => {
                warn!("Idle detection unsupported, disabling idle reset");
                self.config.idle.enabled = false;
                Some(Event::idle_error(self.state, IdleError::Unsupported.to_string()))
            }
            Err(e) => {
                warn!("Idle query failed: {}", e);
                Some(Event::idle_error(self.state, e.to_string()))
            }
            Ok(idle) if idle >= self.config.idle.reset_after => {
                info!("User idle for {}s, restarting work countdowns", idle.as_secs());
                self.countdowns.reset_work(&self.config);
                Some(Event::idle_reset(self.state))
            }
            Ok(_) => None,
        }
    }

    // ── Tick ─────────────────────────────────────────────────────────

    /// Advance the session by one tick interval
    pub fn tick(&mut self, now: Instant) -> Vec<Event> {
        match self.state {
            SessionState::Paused => Vec::new(),
            SessionState::Work => self.advance_work(now),
            SessionState::ShortBreak | SessionState::LongBreak => vec![self.advance_break()],
        }
    }

    fn advance_work(&mut self, now: Instant) -> Vec<Event> {
        let delta = self.tick_interval;

        if self.config.long.base.is_active() {
            self.countdowns.next_long = self.countdowns.next_long.saturating_sub(delta);
            if self.countdowns.next_long.is_zero() {
                return vec![self.enter_break(BreakKind::Long)];
            }
        }
        if self.config.short.is_active() {
            self.countdowns.next_short = self.countdowns.next_short.saturating_sub(delta);
            if self.countdowns.next_short.is_zero() {
                return vec![self.enter_break(BreakKind::Short)];
            }
        }

        self.work_progress(now).into_iter().collect()
    }

    fn work_progress(&mut self, now: Instant) -> Option<Event> {
        if let Some(last) = self.last_progress_sent {
            if now.saturating_duration_since(last) < self.tick_interval {
                return None;
            }
        }
        self.last_progress_sent = Some(now);
        Some(Event::progress(
            self.state,
            self.countdowns.next_break(&self.config),
            self.countdowns.work_progress(&self.config),
        ))
    }

    fn advance_break(&mut self) -> Event {
        self.countdowns.remaining = self.countdowns.remaining.saturating_sub(self.tick_interval);
        if self.countdowns.remaining.is_zero() {
            info!("{} finished", self.state);
            return self.return_to_work();
        }

        let duration = self.config.break_duration(self.state);
        Event::progress(
            self.state,
            self.countdowns.remaining,
            self.countdowns.break_progress(duration),
        )
        .with_strict_mode(self.config.is_strict(self.state))
    }

    fn enter_break(&mut self, kind: BreakKind) -> Event {
        self.state = kind.state();
        match kind {
            BreakKind::Long => {
                self.countdowns.remaining = self.config.long.base.duration;
                self.countdowns.reset_work(&self.config);
            }
            BreakKind::Short => {
                self.countdowns.remaining = self.config.short.duration;
                self.countdowns.next_short = self.config.short.interval;
            }
        }
        debug!("Entered {} for {}s", self.state, self.countdowns.remaining.as_secs());

        Event::state_change(self.state)
            .with_remaining(self.countdowns.remaining)
            .with_strict_mode(self.config.is_strict(self.state))
    }

    /// Leaving a short break restarts only the short countdown so the long
    /// break keeps its own cadence; leaving a long break restarts both.
    fn return_to_work(&mut self) -> Event {
        let from = self.state;
        self.state = SessionState::Work;
        self.countdowns.remaining = Duration::ZERO;
        if from == SessionState::LongBreak {
            self.countdowns.reset_work(&self.config);
        } else {
            self.countdowns.next_short = self.config.short.interval;
        }
        Event::state_change(SessionState::Work)
            .with_remaining(self.countdowns.next_break(&self.config))
    }

    fn visible_remaining(&self) -> Duration {
        if self.state.is_break() {
            self.countdowns.remaining
        } else {
            self.countdowns.next_break(&self.config)
        }
    }
}

fn enabled_label(enabled: bool) -> &'static str {
    if enabled { "enabled" } else { "disabled" }
}
