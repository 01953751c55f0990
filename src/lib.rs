//! EagleEye - a break-reminder scheduler
//! 
//! This library tracks elapsed work time, fires short and long rest breaks on a
//! configurable cadence and broadcasts every decision to independent observers
//! (overlay, tray, logs) without letting a slow observer stall the schedule.

pub mod config;
pub mod error;
pub mod events;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::AppError;
pub use events::{Event, EventKind, EventReceiver};
pub use services::{IdleChecker, IdleError};
pub use state::{
    AppState, BreakKind, ScheduleConfig, SessionState, SkipOutcome, StatusSnapshot, TimeKeeper,
};
pub use api::create_router;
pub use utils::signals::shutdown_signal;
