//! State management module
//! 
//! This module contains the break scheduler: its configuration, countdowns,
//! the pure state machine and the thread-safe keeper that drives it.

pub mod app_state;
pub mod countdown;
pub mod machine;
pub mod schedule;
pub mod session_state;
pub mod time_keeper;

// Re-export main types
pub use app_state::AppState;
pub use countdown::Countdowns;
pub use machine::{BreakMachine, StatusSnapshot};
pub use schedule::{BreakConfig, IdleResetConfig, LongBreakConfig, ScheduleConfig};
pub use session_state::{BreakKind, SessionState};
pub use time_keeper::{IdleProbe, SkipOutcome, TimeKeeper};
