//! Session state of the break scheduler

use std::fmt;

use serde::{Deserialize, Serialize};

/// The mode the scheduler is in. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Work,
    ShortBreak,
    LongBreak,
    Paused,
}

impl SessionState {
    /// Check if the state is one of the two break states
    pub fn is_break(&self) -> bool {
        matches!(self, SessionState::ShortBreak | SessionState::LongBreak)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Work => "work",
            SessionState::ShortBreak => "short_break",
            SessionState::LongBreak => "long_break",
            SessionState::Paused => "paused",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Break type that can be requested through `force_break`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakKind {
    Short,
    Long,
}

impl BreakKind {
    /// The session state a break of this kind runs in
    pub fn state(&self) -> SessionState {
        match self {
            BreakKind::Short => SessionState::ShortBreak,
            BreakKind::Long => SessionState::LongBreak,
        }
    }

    /// Parse the path segment used by the HTTP surface
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "short" | "short_break" => Some(BreakKind::Short),
            "long" | "long_break" => Some(BreakKind::Long),
            _ => None,
        }
    }
}
