//! Event values handed to every observer

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::SessionState;
use crate::utils::duration::millis;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    StateChange,
    Progress,
    IdleReset,
    IdleError,
}

/// Immutable notification emitted by the scheduler.
///
/// `remaining` depends on context: time left in the break while a break runs,
/// time to the next break while working.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub kind: EventKind,
    pub state: SessionState,
    #[serde(with = "millis", rename = "remaining_ms")]
    pub remaining: Duration,
    pub progress: f64,
    pub strict_mode: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub at: DateTime<Utc>,
}

impl Event {
    fn new(kind: EventKind, state: SessionState) -> Self {
        Self {
            kind,
            state,
            remaining: Duration::ZERO,
            progress: 0.0,
            strict_mode: false,
            message: None,
            at: Utc::now(),
        }
    }

    pub fn state_change(state: SessionState) -> Self {
        Self::new(EventKind::StateChange, state)
    }

    pub fn progress(state: SessionState, remaining: Duration, progress: f64) -> Self {
        Self {
            remaining,
            progress: progress.clamp(0.0, 1.0),
            ..Self::new(EventKind::Progress, state)
        }
    }

    pub fn idle_reset(state: SessionState) -> Self {
        Self::new(EventKind::IdleReset, state).with_message("idle reset")
    }

    pub fn idle_error(state: SessionState, message: impl Into<String>) -> Self {
        Self::new(EventKind::IdleError, state).with_message(message)
    }

    pub fn with_remaining(mut self, remaining: Duration) -> Self {
        self.remaining = remaining;
        self
    }

    pub fn with_strict_mode(mut self, strict_mode: bool) -> Self {
        self.strict_mode = strict_mode;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn is_state_change_to(&self, state: SessionState) -> bool {
        self.kind == EventKind::StateChange && self.state == state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_clamped() {
        let event = Event::progress(SessionState::Work, Duration::from_secs(1), 1.7);
        assert_eq!(event.progress, 1.0);
        let event = Event::progress(SessionState::Work, Duration::from_secs(1), -0.2);
        assert_eq!(event.progress, 0.0);
    }

    #[test]
    fn serializes_for_observers() {
        let event = Event::state_change(SessionState::LongBreak)
            .with_remaining(Duration::from_secs(300))
            .with_strict_mode(true);
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["kind"], "state_change");
        assert_eq!(value["state"], "long_break");
        assert_eq!(value["remaining_ms"], 300_000);
        assert_eq!(value["strict_mode"], true);
        assert!(value.get("message").is_none());
    }
}
