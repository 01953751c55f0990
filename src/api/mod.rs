//! HTTP API module
//! 
//! This module exposes the scheduler commands (the tray and preferences
//! actions) over HTTP.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/start", post(start_handler))
        .route("/stop", post(stop_handler))
        .route("/pause", post(pause_handler))
        .route("/resume", post(resume_handler))
        .route("/pause-for/:minutes", post(pause_for_handler))
        .route("/skip", post(skip_handler))
        .route("/force/:kind", post(force_handler))
        .route("/idle-reset", post(idle_reset_handler))
        .route("/config", get(get_config_handler).put(put_config_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
