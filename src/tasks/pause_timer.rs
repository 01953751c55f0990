//! Timed pause: pause now, resume automatically later

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};
use tokio::{runtime::Handle, task::JoinHandle, time::sleep};
use tracing::{debug, info, warn};

use crate::state::TimeKeeper;

/// Holds the single pending deferred resume; a new request replaces it
#[derive(Debug, Default)]
pub struct PauseTimer {
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl PauseTimer {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Pause the keeper and schedule a resume after `duration`.
    ///
    /// The pending slot stays locked from cancelling the old resume until the
    /// new one is stored, so concurrent requests leave exactly one resume.
    pub fn pause_for(&self, keeper: &Arc<TimeKeeper>, duration: Duration) {
        if !keeper.is_running() {
            debug!("Timed pause ignored, keeper not running");
            return;
        }
        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                warn!("Cannot schedule resume outside a tokio runtime: {}", e);
                return;
            }
        };

        let mut pending = self.lock();
        if let Some(previous) = pending.take() {
            debug!("Replacing scheduled resume");
            previous.abort();
        }
        keeper.pause();
        info!("Paused for {}s", duration.as_secs());

        let weak = Arc::downgrade(keeper);
        let handle = runtime.spawn(async move {
            sleep(duration).await;
            if let Some(keeper) = weak.upgrade() {
                info!("Timed pause elapsed, resuming");
                keeper.resume();
            }
        });

        *pending = Some(handle);
    }

    /// Drop a scheduled resume, if any
    pub fn cancel(&self) {
        self.cancel_with(|| ());
    }

    /// Cancel a scheduled resume and run `command` before another timed pause
    /// can schedule a new one
    pub fn cancel_with<R>(&self, command: impl FnOnce() -> R) -> R {
        let mut pending = self.lock();
        if let Some(handle) = pending.take() {
            debug!("Cancelling scheduled resume");
            handle.abort();
        }
        command()
    }

    pub fn is_pending(&self) -> bool {
        self.lock().as_ref().is_some_and(|handle| !handle.is_finished())
    }
}
