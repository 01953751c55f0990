//! Fixed-interval tick loop driving the time keeper

use std::{
    sync::{Arc, Weak},
    time::Duration,
};
use tokio::{
    sync::watch,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use crate::{
    services::{IdleChecker, IdleError},
    state::TimeKeeper,
};

/// Background task that ticks the keeper until it is stopped or dropped.
///
/// Idle queries are awaited without the keeper lock held; their result is
/// applied together with the tick they were taken for.
pub async fn tick_loop_task(
    keeper: Weak<TimeKeeper>,
    period: Duration,
    mut stop_rx: watch::Receiver<bool>,
) {
    info!("Starting tick loop");

    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;

            _ = stop_rx.changed() => {
                debug!("Stop signal received");
                break;
            }

            now = interval.tick() => {
                let Some(keeper) = keeper.upgrade() else {
                    debug!("Time keeper dropped");
                    break;
                };

                let idle = match keeper.idle_probe(now) {
                    Some(probe) => Some(query_idle(probe.checker, probe.timeout).await),
                    None => None,
                };

                if !keeper.tick(now, idle) {
                    break;
                }
            }
        }
    }

    info!("Tick loop exited");
}

/// Run an idle query with an upper bound on its duration; on timeout the
/// query future is dropped along with whatever it was waiting on
pub async fn query_idle(
    checker: Arc<dyn IdleChecker>,
    limit: Duration,
) -> Result<Duration, IdleError> {
    match tokio::time::timeout(limit, checker.idle_duration()).await {
        Ok(result) => result,
        Err(_) => {
            warn!("Idle query abandoned after {}ms", limit.as_millis());
            Err(IdleError::Query(format!(
                "idle query timed out after {}ms",
                limit.as_millis()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{ScheduleConfig, SessionState};
    use futures::future::BoxFuture;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test(start_paused = true)]
    async fn exits_when_keeper_is_dropped() {
        let keeper = Arc::new(TimeKeeper::new(ScheduleConfig::default(), Duration::from_secs(1)));
        let (_stop_tx, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(tick_loop_task(Arc::downgrade(&keeper), Duration::from_secs(1), stop_rx));

        drop(keeper);
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn exits_when_keeper_is_not_running() {
        let keeper = Arc::new(TimeKeeper::new(ScheduleConfig::default(), Duration::from_secs(1)));
        let (_stop_tx, stop_rx) = watch::channel(false);
        tick_loop_task(Arc::downgrade(&keeper), Duration::from_secs(1), stop_rx).await;
        assert_eq!(keeper.state(), SessionState::Work);
    }

    /// Checker whose query never finishes; flags when the query is dropped
    struct HungChecker {
        dropped: Arc<AtomicBool>,
    }

    struct DropFlag(Arc<AtomicBool>);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    impl IdleChecker for HungChecker {
        fn idle_duration(&self) -> BoxFuture<'_, Result<Duration, IdleError>> {
            let flag = DropFlag(Arc::clone(&self.dropped));
            Box::pin(async move {
                let _flag = flag;
                futures::future::pending::<()>().await;
                Ok(Duration::ZERO)
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn slow_idle_query_times_out_and_is_dropped() {
        let dropped = Arc::new(AtomicBool::new(false));
        let checker: Arc<dyn IdleChecker> = Arc::new(HungChecker {
            dropped: Arc::clone(&dropped),
        });

        let result = query_idle(checker, Duration::from_secs(5)).await;
        assert!(matches!(result, Err(IdleError::Query(msg)) if msg.contains("timed out")));
        assert!(dropped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn idle_query_passes_result_through() {
        let checker: Arc<dyn IdleChecker> =
            Arc::new(|| -> Result<Duration, IdleError> { Err(IdleError::Unsupported) });
        let result = query_idle(checker, Duration::from_secs(1)).await;
        assert_eq!(result, Err(IdleError::Unsupported));
    }
}
