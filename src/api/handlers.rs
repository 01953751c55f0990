//! HTTP endpoint handlers

use std::{sync::Arc, time::Duration};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::{info, warn};

use crate::{
    state::{AppState, BreakKind, ScheduleConfig, SessionState, SkipOutcome, StatusSnapshot},
    utils::format_remaining,
};
use super::responses::{ApiResponse, HealthResponse, StatusResponse};

/// Handle POST /start - Start the break schedule
pub async fn start_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    let snapshot = state.start();
    Json(ApiResponse::new("Schedule started".to_string(), snapshot))
}

/// Handle POST /stop - Stop the schedule for good
pub async fn stop_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    let snapshot = state.stop();
    Json(ApiResponse::new("Schedule stopped".to_string(), snapshot))
}

/// Handle POST /pause - Freeze all countdowns
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    let snapshot = state.pause();
    Json(ApiResponse::new("Schedule paused".to_string(), snapshot))
}

/// Handle POST /resume - Continue where the pause left off
pub async fn resume_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    let snapshot = state.resume();
    Json(ApiResponse::new("Schedule resumed".to_string(), snapshot))
}

/// Handle POST /pause-for/:minutes - Pause and resume automatically
pub async fn pause_for_handler(
    State(state): State<Arc<AppState>>,
    Path(minutes): Path<u64>,
) -> Result<Json<ApiResponse>, StatusCode> {
    let seconds = match minutes.checked_mul(60) {
        Some(seconds) if seconds > 0 => seconds,
        _ => {
            warn!("Rejected pause of {} minutes", minutes);
            return Err(StatusCode::BAD_REQUEST);
        }
    };
    let snapshot = state.pause_for(Duration::from_secs(seconds));
    Ok(Json(ApiResponse::new(
        format!("Schedule paused for {} minutes", minutes),
        snapshot,
    )))
}

/// Handle POST /skip - End the current break early
pub async fn skip_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    match state.skip_break() {
        (SkipOutcome::Strict, _) => {
            info!("Skip refused, long break is strict");
            Err(StatusCode::CONFLICT)
        }
        (_, snapshot) => Ok(Json(ApiResponse::new("Break skipped".to_string(), snapshot))),
    }
}

/// Handle POST /force/:kind - Take a short or long break right now
pub async fn force_handler(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
) -> Result<Json<ApiResponse>, StatusCode> {
    let kind = BreakKind::from_name(&kind).ok_or_else(|| {
        warn!("Unknown break kind: {}", kind);
        StatusCode::BAD_REQUEST
    })?;
    let snapshot = state.force_break(kind);
    Ok(Json(ApiResponse::new(format!("Forced {:?} break", kind), snapshot)))
}

/// Handle POST /idle-reset - Restart work countdowns
pub async fn idle_reset_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    let snapshot = state.reset_for_idle();
    Json(ApiResponse::new("Work countdowns restarted".to_string(), snapshot))
}

/// Handle GET /config - Current schedule
pub async fn get_config_handler(State(state): State<Arc<AppState>>) -> Json<ScheduleConfig> {
    Json(state.keeper.config())
}

/// Handle PUT /config - Replace the schedule
pub async fn put_config_handler(
    State(state): State<Arc<AppState>>,
    Json(config): Json<ScheduleConfig>,
) -> Json<ApiResponse> {
    let snapshot = state.update_config(config);
    Json(ApiResponse::new("Schedule updated".to_string(), snapshot))
}

/// Handle GET /status - Return current scheduler status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let snapshot = state.keeper.snapshot();
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        running: state.keeper.is_running(),
        summary: summary(&snapshot),
        snapshot,
        pause_pending: state.pause_timer.is_pending(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

fn summary(snapshot: &StatusSnapshot) -> String {
    match snapshot.state {
        SessionState::Work => format!("next break in {}", format_remaining(snapshot.next_break)),
        SessionState::ShortBreak | SessionState::LongBreak => format!(
            "{} ends in {}",
            snapshot.state,
            format_remaining(snapshot.countdowns.remaining)
        ),
        SessionState::Paused => "paused".to_string(),
    }
}
