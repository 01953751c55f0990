//! Background tasks module
//! 
//! This module contains the tasks that run alongside the scheduler: the tick
//! loop itself, deferred resumes and the event log observer.

pub mod event_log;
pub mod pause_timer;
pub mod tick_loop;

// Re-export main functions
pub use event_log::{event_log_task, EventJournal};
pub use pause_timer::PauseTimer;
pub use tick_loop::tick_loop_task;
