//! Idle-duration query capability consumed by the scheduler

use std::time::Duration;

use futures::future::{self, BoxFuture};
use thiserror::Error;

/// Failure of an idle query
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdleError {
    /// The platform cannot report idle time; never retried
    #[error("idle detection unsupported")]
    Unsupported,

    /// Transient failure; the next poll tries again
    #[error("idle query failed: {0}")]
    Query(String),
}

impl IdleError {
    pub fn is_unsupported(&self) -> bool {
        matches!(self, IdleError::Unsupported)
    }
}

/// Reports the time since the last user input.
///
/// The tick loop awaits the returned future under a timeout and drops it when
/// the timeout fires, so implementations must release their resources on drop.
pub trait IdleChecker: Send + Sync {
    fn idle_duration(&self) -> BoxFuture<'_, Result<Duration, IdleError>>;
}

/// Checker for platforms without idle detection
#[derive(Debug, Default, Clone, Copy)]
pub struct NoIdleChecker;

impl IdleChecker for NoIdleChecker {
    fn idle_duration(&self) -> BoxFuture<'_, Result<Duration, IdleError>> {
        Box::pin(future::ready(Err(IdleError::Unsupported)))
    }
}

/// Plain closures answer immediately
impl<F> IdleChecker for F
where
    F: Fn() -> Result<Duration, IdleError> + Send + Sync,
{
    fn idle_duration(&self) -> BoxFuture<'_, Result<Duration, IdleError>> {
        Box::pin(future::ready(self()))
    }
}
