//! EagleEye - a break-reminder scheduler
//!
//! This is the main entry point: it runs the time keeper, logs its events and
//! serves the control API used by the tray and preferences front-ends.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use eagle_eye::{
    api::create_router,
    config::Config,
    error::AppError,
    services::IdleChecker,
    state::{AppState, TimeKeeper},
    tasks::event_log_task,
    utils::shutdown_signal,
};

/// Buffer of the event log subscription
const EVENT_LOG_BUFFER: usize = 5;

#[cfg(target_os = "linux")]
fn idle_checker(config: &Config) -> Arc<dyn IdleChecker> {
    let checker = eagle_eye::services::XprintIdle::detect();
    if config.idle_reset && !checker.is_available() {
        warn!("Idle reset requested but xprintidle is missing; install it to enable idle reset");
    }
    Arc::new(checker)
}

#[cfg(not(target_os = "linux"))]
fn idle_checker(config: &Config) -> Arc<dyn IdleChecker> {
    if config.idle_reset {
        warn!("Idle reset is not supported on this platform");
    }
    Arc::new(eagle_eye::services::NoIdleChecker)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("eagle_eye={},tower_http=info", config.log_level()))
        .init();

    info!("Starting eagle-eye v{}", env!("CARGO_PKG_VERSION"));
    let schedule = config.schedule()?;
    info!(
        "Schedule: short every {}min for {}s, long every {}min for {}min, idle reset {}",
        config.short_interval_min,
        config.short_duration_sec,
        config.long_interval_min,
        config.long_duration_min,
        if config.idle_reset { "on" } else { "off" }
    );

    let keeper = Arc::new(
        TimeKeeper::new(schedule, config.tick_interval()).with_idle_checker(idle_checker(&config)),
    );

    // Subscribe before starting so the first state change is logged
    let events = keeper.subscribe(EVENT_LOG_BUFFER);
    let log_task = tokio::spawn(event_log_task(events, config.event_log.clone()));

    keeper.start();

    let state = Arc::new(AppState::new(Arc::clone(&keeper), config.port, config.host.clone()));
    let app = create_router(state);

    let addr = config.address();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| AppError::Bind { address: addr.clone(), source })?;

    info!("Control API on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /start, /stop, /pause, /resume, /skip");
    info!("  POST /pause-for/:minutes");
    info!("  POST /force/:kind        - kind is short or long");
    info!("  POST /idle-reset");
    info!("  GET  /status, /config    PUT /config");
    info!("  GET  /health");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    keeper.stop();
    if let Err(e) = log_task.await {
        tracing::error!("Event log task failed: {}", e);
    }

    info!("Shutdown complete");
    Ok(())
}
