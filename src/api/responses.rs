//! API request and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    analytics::CounterEvent,
    presentation::TimerView,
    timer::{Reconciliation, SessionKind},
};

/// API response structure for timer endpoints
#[derive(Debug, Clone, Serialize)]
pub struct TimerResponse {
    /// Run state after the action (`stopped`, `running`, `paused`)
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerView,
}

impl TimerResponse {
    pub fn new(message: impl Into<String>, timer: TimerView) -> Self {
        Self {
            status: timer.run_state.to_string(),
            message: message.into(),
            timestamp: Utc::now(),
            timer,
        }
    }
}

/// Response to a visibility change
#[derive(Debug, Clone, Serialize)]
pub struct VisibilityResponse {
    pub reconciliation: Option<Reconciliation>,
    pub timer: TimerView,
}

/// Server status with a compact timer summary
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub timer_state: String,
    pub session: SessionKind,
    pub remaining_seconds: u32,
    pub completed_pomodoros: u32,
    pub task_count: usize,
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

/// Body of an analytics increment response
#[derive(Debug, Clone, Serialize)]
pub struct IncrementResponse {
    pub event: CounterEvent,
    pub total: u64,
}

/// JSON error body used by the analytics endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VisibilityRequest {
    pub visible: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTaskRequest {
    pub title: String,
    #[serde(default)]
    pub priority: Option<u8>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskUpdateRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub priority: Option<u8>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TitleRequest {
    pub title: String,
}

/// Move the item at `from` to `to`
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ReorderRequest {
    pub from: usize,
    pub to: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IncrementRequest {
    #[serde(default)]
    pub event: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResetQuery {
    #[serde(default)]
    pub key: Option<String>,
}
