//! Thread-safe break scheduler driven by a background tick loop

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};
use tokio::{runtime::Handle, sync::watch, time::Instant};
use tracing::{debug, error, info};

use super::{BreakKind, BreakMachine, ScheduleConfig, SessionState, StatusSnapshot};
use crate::{
    events::{Broadcaster, Event, EventReceiver},
    services::{IdleChecker, IdleError},
    tasks::tick_loop_task,
};

/// Shortest time an idle query is allowed to run
const MIN_IDLE_QUERY_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Idle,
    Running,
    /// Terminal; a stopped keeper cannot be restarted
    Stopped,
}

/// Idle query the tick loop should run outside the lock
pub struct IdleProbe {
    pub checker: Arc<dyn IdleChecker>,
    pub timeout: Duration,
}

/// Result of a skip that honors strict mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipOutcome {
    Skipped,
    /// The current long break is strict and keeps running
    Strict,
    /// Not running or not in a break
    Ignored,
}

struct Inner {
    machine: BreakMachine,
    broadcaster: Broadcaster,
    lifecycle: Lifecycle,
    idle_checker: Option<Arc<dyn IdleChecker>>,
    stop_tx: Option<watch::Sender<bool>>,
}

impl Inner {
    fn emit(&mut self, event: Option<Event>) {
        if let Some(event) = event {
            self.broadcaster.broadcast(&event);
        }
    }

    fn is_running(&self) -> bool {
        self.lifecycle == Lifecycle::Running
    }
}

/// Break scheduler shared between the tick loop and command callers.
///
/// Every public operation holds the single state mutex for its whole critical
/// section, and events are handed to the broadcaster inside that section. Sends
/// never block, so a slow observer cannot hold the lock.
pub struct TimeKeeper {
    inner: Mutex<Inner>,
}

impl TimeKeeper {
    /// Create a keeper; nothing runs until [`start`](Self::start)
    pub fn new(config: ScheduleConfig, tick_interval: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner {
                machine: BreakMachine::new(config, tick_interval),
                broadcaster: Broadcaster::new(),
                lifecycle: Lifecycle::Idle,
                idle_checker: None,
                stop_tx: None,
            }),
        }
    }

    /// Attach the idle-duration capability
    pub fn with_idle_checker(self, checker: Arc<dyn IdleChecker>) -> Self {
        self.set_idle_checker(checker);
        self
    }

    pub fn set_idle_checker(&self, checker: Arc<dyn IdleChecker>) {
        self.lock().idle_checker = Some(checker);
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Every critical section leaves the machine consistent, so a poisoned
        // lock still guards valid state.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Start the session and spawn the tick loop on the current tokio runtime.
    ///
    /// No-op when already running or after [`stop`](Self::stop).
    pub fn start(self: &Arc<Self>) {
        let mut inner = self.lock();
        if inner.lifecycle != Lifecycle::Idle {
            debug!("Start ignored, keeper is {:?}", inner.lifecycle);
            return;
        }
        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                error!("Cannot start time keeper outside a tokio runtime: {}", e);
                return;
            }
        };

        inner.lifecycle = Lifecycle::Running;
        let event = inner.machine.start();
        inner.broadcaster.broadcast(&event);

        let (stop_tx, stop_rx) = watch::channel(false);
        inner.stop_tx = Some(stop_tx);
        let tick_interval = inner.machine.tick_interval();
        drop(inner);

        info!("Time keeper started, ticking every {}ms", tick_interval.as_millis());
        runtime.spawn(tick_loop_task(Arc::downgrade(self), tick_interval, stop_rx));
    }

    /// Stop the tick loop and close every observer channel. Permanent.
    pub fn stop(&self) {
        let mut inner = self.lock();
        if !inner.is_running() {
            debug!("Stop ignored, keeper is {:?}", inner.lifecycle);
            return;
        }
        if let Some(stop_tx) = inner.stop_tx.take() {
            stop_tx.send_replace(true);
        }
        inner.lifecycle = Lifecycle::Stopped;
        inner.broadcaster.close();
        info!("Time keeper stopped");
    }

    pub fn is_running(&self) -> bool {
        self.lock().is_running()
    }

    // ── Observers ────────────────────────────────────────────────────

    /// Register an observer; a zero buffer becomes 1. After `stop` the returned
    /// channel is already closed.
    pub fn subscribe(&self, buffer: usize) -> EventReceiver {
        self.lock().broadcaster.subscribe(buffer)
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().broadcaster.subscriber_count()
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn pause(&self) {
        let mut inner = self.lock();
        if !inner.is_running() {
            debug!("Pause ignored, keeper not running");
            return;
        }
        let event = inner.machine.pause();
        inner.emit(event);
    }

    pub fn resume(&self) {
        let mut inner = self.lock();
        if !inner.is_running() {
            debug!("Resume ignored, keeper not running");
            return;
        }
        let event = inner.machine.resume();
        inner.emit(event);
    }

    /// Replace the schedule; work countdowns restart, a running break is kept
    pub fn update_config(&self, config: ScheduleConfig) {
        self.lock().machine.update_config(config);
    }

    pub fn skip_break(&self) {
        let mut inner = self.lock();
        if !inner.is_running() {
            debug!("Skip ignored, keeper not running");
            return;
        }
        let event = inner.machine.skip_break();
        inner.emit(event);
    }

    /// Skip the current break unless it is a strict long break. The check and
    /// the skip share one critical section, so a tick cannot slip a strict
    /// break in between.
    pub fn skip_unless_strict(&self) -> SkipOutcome {
        let mut inner = self.lock();
        if !inner.is_running() {
            debug!("Skip ignored, keeper not running");
            return SkipOutcome::Ignored;
        }
        if inner.machine.config().is_strict(inner.machine.state()) {
            debug!("Skip refused, {} is strict", inner.machine.state());
            return SkipOutcome::Strict;
        }
        match inner.machine.skip_break() {
            Some(event) => {
                inner.broadcaster.broadcast(&event);
                SkipOutcome::Skipped
            }
            None => SkipOutcome::Ignored,
        }
    }

    pub fn force_break(&self, kind: BreakKind) {
        let mut inner = self.lock();
        if !inner.is_running() {
            debug!("Force break ignored, keeper not running");
            return;
        }
        let event = inner.machine.force_break(kind);
        inner.emit(event);
    }

    /// Restart work countdowns without changing state
    pub fn reset_for_idle(&self) {
        self.lock().machine.reset_for_idle();
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.lock().machine.state()
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        self.lock().machine.snapshot()
    }

    pub fn config(&self) -> ScheduleConfig {
        *self.lock().machine.config()
    }

    pub fn tick_interval(&self) -> Duration {
        self.lock().machine.tick_interval()
    }

    // ── Tick loop hooks ──────────────────────────────────────────────

    /// Claim an idle check for the tick at `now` if one is due
    pub fn idle_probe(&self, now: Instant) -> Option<IdleProbe> {
        let mut inner = self.lock();
        if !inner.is_running() {
            return None;
        }
        let checker = inner.idle_checker.clone()?;
        if !inner.machine.idle_check_due(now) {
            return None;
        }
        let timeout = inner.machine.config().idle.check_interval.max(MIN_IDLE_QUERY_TIMEOUT);
        Some(IdleProbe { checker, timeout })
    }

    /// Apply one tick, folding in the idle result gathered for it.
    ///
    /// Returns `false` once the keeper no longer runs so the loop can exit.
    pub fn tick(&self, now: Instant, idle: Option<Result<Duration, IdleError>>) -> bool {
        let mut inner = self.lock();
        if !inner.is_running() {
            return false;
        }
        if let Some(result) = idle {
            let event = inner.machine.apply_idle_result(result);
            inner.emit(event);
        }
        for event in inner.machine.tick(now) {
            inner.broadcaster.broadcast(&event);
        }
        true
    }
}

impl std::fmt::Debug for TimeKeeper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("TimeKeeper")
            .field("lifecycle", &inner.lifecycle)
            .field("machine", &inner.machine)
            .field("subscribers", &inner.broadcaster.subscriber_count())
            .finish()
    }
}
