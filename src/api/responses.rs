//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::{TimerId, TimerSnapshot};

/// API response structure for command endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timers: Vec<TimerSnapshot>,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: String, message: String, timers: Vec<TimerSnapshot>) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            timers,
        }
    }

    /// Create a response for a timer that is now running
    pub fn running(message: String, timers: Vec<TimerSnapshot>) -> Self {
        Self::new("running".to_string(), message, timers)
    }

    /// Create a response for a timer that is now paused
    pub fn paused(message: String, timers: Vec<TimerSnapshot>) -> Self {
        Self::new("paused".to_string(), message, timers)
    }

    /// Create a plain success response
    pub fn ok(message: String, timers: Vec<TimerSnapshot>) -> Self {
        Self::new("ok".to_string(), message, timers)
    }
}

/// Error body returned for rejected commands
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    /// Create a new error body
    pub fn new(message: String) -> Self {
        Self {
            status: "error".to_string(),
            message,
            timestamp: Utc::now(),
        }
    }
}

/// Enhanced status response with registry and server information
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub timers: Vec<TimerSnapshot>,
    pub active_timer: Option<TimerId>,
    pub archived_count: usize,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
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
            version: "1.0.0".to_string(),
        }
    }
}
