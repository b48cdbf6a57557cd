//! Task management API endpoints.

use std::sync::Arc;

use api_protocol::{
    CreateTaskRequest, CreateTaskResponse, ListTasksResponse, TaskResponse, UpdateTaskRequest,
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use task_store::TaskStore;
use uuid::Uuid;

use crate::error::{ServerError, ServerResult};
use crate::middleware::CurrentUser;
use crate::services::tasks;
use crate::state::AppState;

/// Parses a task id from the path. A malformed id names no task.
pub(crate) fn parse_task_id(raw: &str) -> ServerResult<Uuid> {
    raw.parse()
        .map_err(|_| ServerError::NotFound("Task not found".to_string()))
}

/// Lists the caller's tasks.
pub async fn list_tasks<S: TaskStore>(
    State(state): State<Arc<AppState<S>>>,
    CurrentUser(user): CurrentUser,
) -> ServerResult<Json<ListTasksResponse>> {
    let tasks = tasks::list_tasks(&state.store, user.id).await?;
    Ok(Json(ListTasksResponse { tasks }))
}

/// Creates a new task.
pub async fn create_task<S: TaskStore>(
    State(state): State<Arc<AppState<S>>>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> ServerResult<(StatusCode, Json<CreateTaskResponse>)> {
    let Json(request) = payload?;
    let new_task = request.validate().map_err(ServerError::Validation)?;

    let task = tasks::create_task(&state.store, user.id, new_task).await?;
    Ok((StatusCode::CREATED, Json(CreateTaskResponse { task })))
}

/// Gets a task by ID.
pub async fn get_task<S: TaskStore>(
    State(state): State<Arc<AppState<S>>>,
    CurrentUser(user): CurrentUser,
    Path(task_id): Path<String>,
) -> ServerResult<Json<TaskResponse>> {
    let task_id = parse_task_id(&task_id)?;
    let task = tasks::get_task(&state.store, user.id, task_id).await?;
    Ok(Json(TaskResponse { task }))
}

/// Updates title, description or status.
pub async fn update_task<S: TaskStore>(
    State(state): State<Arc<AppState<S>>>,
    CurrentUser(user): CurrentUser,
    Path(task_id): Path<String>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> ServerResult<Json<TaskResponse>> {
    let task_id = parse_task_id(&task_id)?;
    let Json(request) = payload?;
    let patch = request.validate().map_err(ServerError::Validation)?;

    let task = tasks::update_task(&state.store, user.id, task_id, patch).await?;
    Ok(Json(TaskResponse { task }))
}

/// Deletes a task and its time logs.
pub async fn delete_task<S: TaskStore>(
    State(state): State<Arc<AppState<S>>>,
    CurrentUser(user): CurrentUser,
    Path(task_id): Path<String>,
) -> ServerResult<StatusCode> {
    let task_id = parse_task_id(&task_id)?;
    tasks::delete_task(&state.store, user.id, task_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
