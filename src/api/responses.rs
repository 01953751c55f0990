//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::StatusSnapshot;

/// API response structure for command endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub snapshot: StatusSnapshot,
}

impl ApiResponse {
    /// Create a new API response; `status` is the session state after the command
    pub fn new(message: String, snapshot: StatusSnapshot) -> Self {
        Self {
            status: snapshot.state.to_string(),
            message,
            timestamp: Utc::now(),
            snapshot,
        }
    }
}

/// Status response with scheduler and server information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub running: bool,
    pub snapshot: StatusSnapshot,
    /// Tray-style status line, e.g. "next break in 12:30"
    pub summary: String,
    pub pause_pending: bool,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
