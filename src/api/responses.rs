//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    state::{FlashlightState, LevelCalibration, LevelSnapshot, Notification},
    timer::TimerSnapshot,
};

/// Response for timer start/cancel requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerSnapshot,
}

impl TimerResponse {
    pub fn new(status: &str, message: String, timer: TimerSnapshot) -> Self {
        Self {
            status: status.to_string(),
            message,
            timestamp: Utc::now(),
            timer,
        }
    }

    pub fn started(timer: TimerSnapshot) -> Self {
        let message = format!("Countdown started at {}", timer.display);
        Self::new("running", message, timer)
    }

    /// The request was declined; the timer is reported unchanged
    pub fn ignored(reason: String, timer: TimerSnapshot) -> Self {
        Self::new("ignored", reason, timer)
    }

    pub fn cancelled(timer: TimerSnapshot) -> Self {
        Self::new("cancelled", "Countdown cancelled".to_string(), timer)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlashlightResponse {
    pub on: bool,
    pub timestamp: DateTime<Utc>,
}

impl From<FlashlightState> for FlashlightResponse {
    fn from(state: FlashlightState) -> Self {
        Self {
            on: state.on,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelResponse {
    pub calibration: LevelCalibration,
    pub latest: Option<LevelSnapshot>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsResponse {
    pub notifications: Vec<Notification>,
}

/// Overall status of every tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timer: TimerSnapshot,
    pub flashlight: FlashlightState,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Error body for rejected requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
