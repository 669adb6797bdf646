//! HTTP endpoint handlers for the timer, settings and server status

use std::sync::Arc;
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use tracing::{error, info, warn};

use crate::{
    analytics::AnalyticsError,
    error::AppError,
    presentation::{CompletedSummary, TimerView},
    state::{AppState, Settings, SettingsPatch},
    storage::StorageError,
    todo::TodoError,
};
use super::responses::{
    HealthResponse, StatusResponse, TimerResponse, VisibilityRequest, VisibilityResponse,
};

/// Map an application error to a status code, logging it on the way
pub(crate) fn reject(context: &str, e: AppError) -> StatusCode {
    let status = match &e {
        AppError::Todo(TodoError::TaskNotFound(_) | TodoError::SubtaskNotFound { .. }) => {
            StatusCode::NOT_FOUND
        }
        AppError::Todo(TodoError::IndexOutOfRange { .. } | TodoError::InvalidPriority(_))
        | AppError::Analytics(AnalyticsError::InvalidEvent(_)) => StatusCode::BAD_REQUEST,
        AppError::Todo(TodoError::Storage(_))
        | AppError::Analytics(AnalyticsError::Storage(StorageError::QuotaExceeded { .. })) => {
            StatusCode::INSUFFICIENT_STORAGE
        }
        AppError::LockPoisoned(_)
        | AppError::Analytics(AnalyticsError::LockPoisoned | AnalyticsError::Storage(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    if status.is_server_error() {
        error!("{}: {}", context, e);
    } else {
        warn!("{}: {}", context, e);
    }
    status
}

fn timer_response(
    result: Result<TimerView, AppError>,
    message: &str,
) -> Result<Json<TimerResponse>, StatusCode> {
    match result {
        Ok(view) => Ok(Json(TimerResponse::new(message, view))),
        Err(e) => Err(reject("Timer action failed", e)),
    }
}

/// Handle GET /timer - Current timer view
pub async fn timer_handler(State(state): State<Arc<AppState>>) -> Result<Json<TimerResponse>, StatusCode> {
    timer_response(state.timer_view(), "Current timer")
}

/// Handle POST /timer/start
pub async fn start_handler(State(state): State<Arc<AppState>>) -> Result<Json<TimerResponse>, StatusCode> {
    timer_response(state.start_timer(), "Timer started")
}

/// Handle POST /timer/pause
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> Result<Json<TimerResponse>, StatusCode> {
    timer_response(state.pause_timer(), "Timer paused")
}

/// Handle POST /timer/toggle - Start when idle, pause when running
pub async fn toggle_handler(State(state): State<Arc<AppState>>) -> Result<Json<TimerResponse>, StatusCode> {
    timer_response(state.toggle_timer(), "Timer toggled")
}

/// Handle POST /timer/reset - Back to the start of the current session
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Result<Json<TimerResponse>, StatusCode> {
    timer_response(state.reset_timer(), "Timer reset")
}

/// Handle POST /timer/skip - Switch session without crediting it
pub async fn skip_handler(State(state): State<Arc<AppState>>) -> Result<Json<TimerResponse>, StatusCode> {
    timer_response(state.skip_session(), "Session skipped")
}

/// Handle POST /timer/visibility - A client became visible or hidden
pub async fn visibility_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<VisibilityRequest>,
) -> Result<Json<VisibilityResponse>, StatusCode> {
    if !request.visible {
        return match state.timer_view() {
            Ok(timer) => Ok(Json(VisibilityResponse { reconciliation: None, timer })),
            Err(e) => Err(reject("Failed to read timer", e)),
        };
    }

    match state.foreground() {
        Ok((reconciliation, timer)) => {
            info!("Client visible again: {:?}", reconciliation);
            Ok(Json(VisibilityResponse {
                reconciliation: Some(reconciliation),
                timer,
            }))
        }
        Err(e) => Err(reject("Failed to reconcile timer", e)),
    }
}

/// Handle GET /settings
pub async fn get_settings_handler(State(state): State<Arc<AppState>>) -> Result<Json<Settings>, StatusCode> {
    state
        .settings()
        .map(Json)
        .map_err(|e| reject("Failed to read settings", e))
}

/// Handle PUT /settings - Partial update; values are corrected into range
pub async fn update_settings_handler(
    State(state): State<Arc<AppState>>,
    Json(patch): Json<SettingsPatch>,
) -> Result<Json<Settings>, StatusCode> {
    match state.update_settings(&patch) {
        Ok(settings) => {
            info!(
                "Settings updated: focus={}m short={}m long={}m",
                settings.focus_minutes, settings.short_break_minutes, settings.long_break_minutes
            );
            Ok(Json(settings))
        }
        Err(e) => Err(reject("Failed to update settings", e)),
    }
}

/// Handle POST /settings/reset
pub async fn reset_settings_handler(State(state): State<Arc<AppState>>) -> Result<Json<Settings>, StatusCode> {
    state
        .reset_settings()
        .map(Json)
        .map_err(|e| reject("Failed to reset settings", e))
}

/// Handle GET /completed
pub async fn completed_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CompletedSummary>, StatusCode> {
    state
        .completed_summary()
        .map(Json)
        .map_err(|e| reject("Failed to read completed stats", e))
}

/// Handle POST /completed/reset
pub async fn reset_completed_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CompletedSummary>, StatusCode> {
    state
        .reset_completed()
        .map(Json)
        .map_err(|e| reject("Failed to reset completed stats", e))
}

/// Handle GET /status - Return current server status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, StatusCode> {
    let timer = match state.timer_view() {
        Ok(t) => t,
        Err(e) => return Err(reject("Failed to get timer state", e)),
    };

    let task_count = match state.task_document() {
        Ok(doc) => doc.tasks.len(),
        Err(e) => return Err(reject("Failed to get task list", e)),
    };

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timer_state: timer.run_state.to_string(),
        session: timer.session,
        remaining_seconds: timer.snapshot.remaining_seconds,
        completed_pomodoros: timer.completed.pomodoros,
        task_count,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
