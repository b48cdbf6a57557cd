//! Task service: owner-scoped task CRUD.

use api_protocol::NewTask;
use entities::{Task, TaskPatch, TaskSummary};
use task_store::{TaskFilter, TaskStore};
use uuid::Uuid;

use crate::error::{ServerError, ServerResult};

/// Loads a task and checks that `owner_id` owns it.
pub async fn owned_task<S: TaskStore + ?Sized>(
    store: &S,
    task_id: Uuid,
    owner_id: Uuid,
) -> ServerResult<Task> {
    let task = store
        .get_task(task_id)
        .await?
        .ok_or_else(|| ServerError::NotFound("Task not found".to_string()))?;

    if !task.is_owned_by(owner_id) {
        tracing::warn!(task_id = %task_id, user_id = %owner_id, "Cross-user task access denied");
        return Err(ServerError::Forbidden(
            "Task belongs to another user".to_string(),
        ));
    }
    Ok(task)
}

async fn summarize<S: TaskStore + ?Sized>(store: &S, task: Task) -> ServerResult<TaskSummary> {
    let total_time = store.total_time(task.id).await?;
    Ok(TaskSummary { task, total_time })
}

/// Lists the owner's tasks, newest first, with completed time totals.
pub async fn list_tasks<S: TaskStore + ?Sized>(
    store: &S,
    owner_id: Uuid,
) -> ServerResult<Vec<TaskSummary>> {
    Ok(store.list_tasks(TaskFilter::owned_by(owner_id)).await?)
}

pub async fn create_task<S: TaskStore + ?Sized>(
    store: &S,
    owner_id: Uuid,
    new_task: NewTask,
) -> ServerResult<Task> {
    let mut task = Task::new(owner_id, new_task.title).with_status(new_task.status);
    task.description = new_task.description;

    let task = store.create_task(task).await?;
    tracing::info!(task_id = %task.id, user_id = %owner_id, "Task created");
    Ok(task)
}

pub async fn get_task<S: TaskStore + ?Sized>(
    store: &S,
    owner_id: Uuid,
    task_id: Uuid,
) -> ServerResult<TaskSummary> {
    let task = owned_task(store, task_id, owner_id).await?;
    summarize(store, task).await
}

pub async fn update_task<S: TaskStore + ?Sized>(
    store: &S,
    owner_id: Uuid,
    task_id: Uuid,
    patch: TaskPatch,
) -> ServerResult<TaskSummary> {
    let mut task = owned_task(store, task_id, owner_id).await?;
    if !patch.is_empty() {
        patch.apply(&mut task);
        task = store.update_task(task).await?;
        tracing::info!(task_id = %task_id, status = %task.status, "Task updated");
    }
    summarize(store, task).await
}

/// Deletes the task with all its time logs, cancelling a running timer.
pub async fn delete_task<S: TaskStore + ?Sized>(
    store: &S,
    owner_id: Uuid,
    task_id: Uuid,
) -> ServerResult<()> {
    owned_task(store, task_id, owner_id).await?;
    store.delete_task(task_id).await?;
    tracing::info!(task_id = %task_id, user_id = %owner_id, "Task deleted");
    Ok(())
}
