//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;
pub mod stats_handlers;
pub mod task_handlers;

use std::sync::Arc;
use axum::{
    routing::{get, patch, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;
use stats_handlers::*;
use task_handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Timer
        .route("/timer", get(timer_handler))
        .route("/timer/start", post(start_handler))
        .route("/timer/pause", post(pause_handler))
        .route("/timer/toggle", post(toggle_handler))
        .route("/timer/reset", post(reset_handler))
        .route("/timer/skip", post(skip_handler))
        .route("/timer/visibility", post(visibility_handler))
        .route("/settings", get(get_settings_handler).put(update_settings_handler))
        .route("/settings/reset", post(reset_settings_handler))
        .route("/completed", get(completed_handler))
        .route("/completed/reset", post(reset_completed_handler))
        // Tasks
        .route(
            "/tasks",
            get(list_tasks_handler).post(add_task_handler).delete(clear_tasks_handler),
        )
        .route("/tasks/reorder", post(reorder_tasks_handler))
        .route("/tasks/:id", patch(update_task_handler).delete(delete_task_handler))
        .route("/tasks/:id/toggle", post(toggle_task_handler))
        .route("/tasks/:id/expand", post(expand_task_handler))
        .route("/tasks/:id/subtasks", post(add_subtask_handler))
        .route("/tasks/:id/subtasks/reorder", post(reorder_subtasks_handler))
        .route(
            "/tasks/:id/subtasks/:sid",
            patch(rename_subtask_handler).delete(delete_subtask_handler),
        )
        .route("/tasks/:id/subtasks/:sid/toggle", post(toggle_subtask_handler))
        // Analytics
        .route("/api/stats/increment", post(increment_handler))
        .route("/api/stats/get", get(get_stats_handler))
        .route("/api/stats/reset", post(reset_stats_handler))
        // Server
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
