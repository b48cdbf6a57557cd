//! Timer API endpoints.

use std::sync::Arc;

use api_protocol::{ActiveTimersResponse, ListTimeLogsResponse, TimeLogResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use task_store::TaskStore;

use crate::api::task::parse_task_id;
use crate::error::ServerResult;
use crate::middleware::CurrentUser;
use crate::services::timer;
use crate::state::AppState;

pub async fn start_timer<S: TaskStore>(
    State(state): State<Arc<AppState<S>>>,
    CurrentUser(user): CurrentUser,
    Path(task_id): Path<String>,
) -> ServerResult<(StatusCode, Json<TimeLogResponse>)> {
    let task_id = parse_task_id(&task_id)?;
    let time_log = timer::start_timer(&state.store, state.clock.as_ref(), task_id, user.id).await?;
    Ok((StatusCode::CREATED, Json(TimeLogResponse { time_log })))
}

pub async fn stop_timer<S: TaskStore>(
    State(state): State<Arc<AppState<S>>>,
    CurrentUser(user): CurrentUser,
    Path(task_id): Path<String>,
) -> ServerResult<Json<TimeLogResponse>> {
    let task_id = parse_task_id(&task_id)?;
    let time_log = timer::stop_timer(&state.store, state.clock.as_ref(), task_id, user.id).await?;
    Ok(Json(TimeLogResponse { time_log }))
}

pub async fn list_time_logs<S: TaskStore>(
    State(state): State<Arc<AppState<S>>>,
    CurrentUser(user): CurrentUser,
    Path(task_id): Path<String>,
) -> ServerResult<Json<ListTimeLogsResponse>> {
    let task_id = parse_task_id(&task_id)?;
    let (time_logs, total_time) = timer::list_time_logs(&state.store, task_id, user.id).await?;
    Ok(Json(ListTimeLogsResponse {
        time_logs,
        total_time,
    }))
}

/// Lists every running timer of the caller.
pub async fn list_active_timers<S: TaskStore>(
    State(state): State<Arc<AppState<S>>>,
    CurrentUser(user): CurrentUser,
) -> ServerResult<Json<ActiveTimersResponse>> {
    let time_logs = timer::list_active_timers(&state.store, user.id).await?;
    Ok(Json(ActiveTimersResponse { time_logs }))
}
