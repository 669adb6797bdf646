//! HTTP endpoint handlers for the task list
//!
//! Every mutation responds with the whole list so clients never have to
//! patch their copy.

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::info;

use crate::{
    error::AppError,
    state::AppState,
    todo::{Priority, TaskDocument, TaskList, TodoError},
};
use super::{
    handlers::reject,
    responses::{NewTaskRequest, ReorderRequest, TaskUpdateRequest, TitleRequest},
};

fn task_response<T>(result: Result<(T, TaskDocument), AppError>, context: &str) -> Result<Json<TaskDocument>, StatusCode> {
    result.map(|(_, doc)| Json(doc)).map_err(|e| reject(context, e))
}

fn parse_priority(raw: Option<u8>) -> Result<Priority, TodoError> {
    raw.map_or(Ok(Priority::default()), Priority::try_from)
}

/// Handle GET /tasks
pub async fn list_tasks_handler(State(state): State<Arc<AppState>>) -> Result<Json<TaskDocument>, StatusCode> {
    state
        .task_document()
        .map(Json)
        .map_err(|e| reject("Failed to read tasks", e))
}

/// Handle POST /tasks - Add a task; blank titles are ignored
pub async fn add_task_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NewTaskRequest>,
) -> Result<Json<TaskDocument>, StatusCode> {
    let result = state.update_tasks("task-add", |tasks| {
        let priority = parse_priority(request.priority)?;
        tasks.add_task(&request.title, priority)
    });
    if let Ok((Some(task), _)) = &result {
        info!("Task added: {} (priority {})", task.id, task.priority.value());
    }
    task_response(result, "Failed to add task")
}

/// Handle DELETE /tasks - Remove every task
pub async fn clear_tasks_handler(State(state): State<Arc<AppState>>) -> Result<Json<TaskDocument>, StatusCode> {
    task_response(state.update_tasks("task-clear", TaskList::clear), "Failed to clear tasks")
}

/// Handle PATCH /tasks/:id - Rename and/or change priority
pub async fn update_task_handler(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
    Json(request): Json<TaskUpdateRequest>,
) -> Result<Json<TaskDocument>, StatusCode> {
    let result = state.update_tasks("task-update", |tasks| {
        // Validate before touching anything
        let priority = request.priority.map(Priority::try_from).transpose()?;
        if let Some(title) = &request.title {
            tasks.rename_task(&task_id, title)?;
        }
        if let Some(priority) = priority {
            tasks.set_priority(&task_id, priority)?;
        }
        if tasks.task(&task_id).is_none() {
            return Err(TodoError::TaskNotFound(task_id.clone()));
        }
        Ok(())
    });
    task_response(result, "Failed to update task")
}

/// Handle DELETE /tasks/:id
pub async fn delete_task_handler(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
) -> Result<Json<TaskDocument>, StatusCode> {
    task_response(
        state.update_tasks("task-delete", |tasks| tasks.delete_task(&task_id)),
        "Failed to delete task",
    )
}

/// Handle POST /tasks/:id/toggle - Flip completion, subtasks included
pub async fn toggle_task_handler(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
) -> Result<Json<TaskDocument>, StatusCode> {
    task_response(
        state.update_tasks("task-toggle", |tasks| tasks.toggle_task(&task_id)),
        "Failed to toggle task",
    )
}

/// Handle POST /tasks/:id/expand
pub async fn expand_task_handler(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
) -> Result<Json<TaskDocument>, StatusCode> {
    task_response(
        state.update_tasks("task-expand", |tasks| tasks.toggle_expanded(&task_id)),
        "Failed to expand task",
    )
}

/// Handle POST /tasks/reorder
pub async fn reorder_tasks_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ReorderRequest>,
) -> Result<Json<TaskDocument>, StatusCode> {
    task_response(
        state.update_tasks("task-reorder", |tasks| tasks.reorder_tasks(request.from, request.to)),
        "Failed to reorder tasks",
    )
}

/// Handle POST /tasks/:id/subtasks - Add a subtask; blank titles are ignored
pub async fn add_subtask_handler(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
    Json(request): Json<TitleRequest>,
) -> Result<Json<TaskDocument>, StatusCode> {
    task_response(
        state.update_tasks("subtask-add", |tasks| tasks.add_subtask(&task_id, &request.title)),
        "Failed to add subtask",
    )
}

/// Handle PATCH /tasks/:id/subtasks/:sid - Rename a subtask
pub async fn rename_subtask_handler(
    State(state): State<Arc<AppState>>,
    Path((task_id, subtask_id)): Path<(String, String)>,
    Json(request): Json<TitleRequest>,
) -> Result<Json<TaskDocument>, StatusCode> {
    task_response(
        state.update_tasks("subtask-rename", |tasks| {
            tasks.rename_subtask(&task_id, &subtask_id, &request.title)
        }),
        "Failed to rename subtask",
    )
}

/// Handle DELETE /tasks/:id/subtasks/:sid
pub async fn delete_subtask_handler(
    State(state): State<Arc<AppState>>,
    Path((task_id, subtask_id)): Path<(String, String)>,
) -> Result<Json<TaskDocument>, StatusCode> {
    task_response(
        state.update_tasks("subtask-delete", |tasks| tasks.delete_subtask(&task_id, &subtask_id)),
        "Failed to delete subtask",
    )
}

/// Handle POST /tasks/:id/subtasks/:sid/toggle
pub async fn toggle_subtask_handler(
    State(state): State<Arc<AppState>>,
    Path((task_id, subtask_id)): Path<(String, String)>,
) -> Result<Json<TaskDocument>, StatusCode> {
    task_response(
        state.update_tasks("subtask-toggle", |tasks| tasks.toggle_subtask(&task_id, &subtask_id)),
        "Failed to toggle subtask",
    )
}

/// Handle POST /tasks/:id/subtasks/reorder
pub async fn reorder_subtasks_handler(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
    Json(request): Json<ReorderRequest>,
) -> Result<Json<TaskDocument>, StatusCode> {
    task_response(
        state.update_tasks("subtask-reorder", |tasks| {
            tasks.reorder_subtasks(&task_id, request.from, request.to)
        }),
        "Failed to reorder subtasks",
    )
}
