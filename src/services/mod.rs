//! External capabilities module
//! 
//! This module defines the idle-duration capability the scheduler consumes and
//! the platform adapters that provide it.

pub mod idle;
pub mod xprintidle;

// Re-export main types
pub use idle::{IdleChecker, IdleError, NoIdleChecker};
pub use xprintidle::XprintIdle;
