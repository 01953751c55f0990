//! Scheduler notifications and their fan-out to observers

pub mod broadcaster;
pub mod event;

pub use broadcaster::{Broadcaster, EventReceiver};
pub use event::{Event, EventKind};
