//! Timer lifecycle: start, stop and report time logs for a task.
//!
//! A task is either idle or has exactly one active time log. The store
//! arbitrates concurrent starts; the loser gets a conflict.

use entities::{total_time, TimeLog};
use task_store::{TaskStore, TaskStoreError, TimeLogFilter};
use uuid::Uuid;

use crate::error::{ServerError, ServerResult};
use crate::services::clock::Clock;
use crate::services::tasks::owned_task;

pub async fn start_timer<S: TaskStore + ?Sized>(
    store: &S,
    clock: &dyn Clock,
    task_id: Uuid,
    user_id: Uuid,
) -> ServerResult<TimeLog> {
    owned_task(store, task_id, user_id).await?;

    let log = store
        .start_time_log(TimeLog::start(task_id, user_id, clock.now()))
        .await
        .map_err(|e| match e {
            TaskStoreError::ActiveTimeLogExists { .. } => {
                ServerError::Conflict("Timer is already running for this task".to_string())
            }
            other => other.into(),
        })?;

    tracing::info!(task_id = %task_id, time_log_id = %log.id, "Timer started");
    Ok(log)
}

pub async fn stop_timer<S: TaskStore + ?Sized>(
    store: &S,
    clock: &dyn Clock,
    task_id: Uuid,
    user_id: Uuid,
) -> ServerResult<TimeLog> {
    owned_task(store, task_id, user_id).await?;

    let log = store
        .stop_time_log(task_id, clock.now())
        .await
        .map_err(|e| {
            if e.is_not_found() {
                ServerError::NotFound("No active timer for this task".to_string())
            } else {
                e.into()
            }
        })?;

    tracing::info!(
        task_id = %task_id,
        time_log_id = %log.id,
        duration = log.duration.unwrap_or_default(),
        "Timer stopped"
    );
    Ok(log)
}

/// Sum of completed durations for a task, in seconds.
pub async fn get_total_time<S: TaskStore + ?Sized>(store: &S, task_id: Uuid) -> ServerResult<i64> {
    Ok(store.total_time(task_id).await?)
}

/// All logs for a task, newest first, with their completed total.
pub async fn list_time_logs<S: TaskStore + ?Sized>(
    store: &S,
    task_id: Uuid,
    user_id: Uuid,
) -> ServerResult<(Vec<TimeLog>, i64)> {
    owned_task(store, task_id, user_id).await?;

    let logs = store
        .list_time_logs(TimeLogFilter {
            task_id: Some(task_id),
            ..Default::default()
        })
        .await?;
    let total = total_time(&logs);
    Ok((logs, total))
}

/// Every running timer the user owns. Clients use this to rebuild their
/// display after a reload or restart.
pub async fn list_active_timers<S: TaskStore + ?Sized>(
    store: &S,
    user_id: Uuid,
) -> ServerResult<Vec<TimeLog>> {
    Ok(store
        .list_time_logs(TimeLogFilter {
            user_id: Some(user_id),
            active_only: true,
            ..Default::default()
        })
        .await?)
}
