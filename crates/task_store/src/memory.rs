//! In-memory task store implementation.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use entities::{Task, TaskSummary, TimeLog, User};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    StoreCounts, TaskFilter, TaskStore, TaskStoreError, TaskStoreResult, TimeLogFilter,
};

/// In-memory task store for tests and ephemeral runs.
///
/// Locks are always taken in the order users, tasks, time logs.
#[derive(Debug, Default, Clone)]
pub struct MemoryTaskStore {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
    tasks: Arc<RwLock<HashMap<Uuid, Task>>>,
    time_logs: Arc<RwLock<HashMap<Uuid, TimeLog>>>,
}

impl MemoryTaskStore {
    /// Creates a new in-memory task store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches_log(log: &TimeLog, filter: &TimeLogFilter) -> bool {
    filter.task_id.is_none_or(|id| log.task_id == id)
        && filter.user_id.is_none_or(|id| log.user_id == id)
        && (!filter.active_only || log.is_active())
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    // =========================================================================
    // User operations
    // =========================================================================

    async fn create_user(&self, user: User) -> TaskStoreResult<User> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.id) {
            return Err(TaskStoreError::already_exists("User", user.id.to_string()));
        }
        if users.values().any(|u| u.email == user.email) {
            return Err(TaskStoreError::already_exists("User", user.email.clone()));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> TaskStoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> TaskStoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    // =========================================================================
    // Task operations
    // =========================================================================

    async fn create_task(&self, task: Task) -> TaskStoreResult<Task> {
        if !self.users.read().await.contains_key(&task.owner_id) {
            return Err(TaskStoreError::not_found("User", task.owner_id.to_string()));
        }
        let mut tasks = self.tasks.write().await;
        if tasks.contains_key(&task.id) {
            return Err(TaskStoreError::already_exists("Task", task.id.to_string()));
        }
        tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn get_task(&self, id: Uuid) -> TaskStoreResult<Option<Task>> {
        let tasks = self.tasks.read().await;
        Ok(tasks.get(&id).cloned())
    }

    async fn list_tasks(&self, filter: TaskFilter) -> TaskStoreResult<Vec<TaskSummary>> {
        let tasks = self.tasks.read().await;
        let logs = self.time_logs.read().await;

        let mut result: Vec<Task> = tasks
            .values()
            .filter(|t| filter.owner_id.is_none_or(|id| t.owner_id == id))
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(result
            .into_iter()
            .map(|task| {
                let total_time = entities::total_time(logs.values().filter(|l| l.task_id == task.id));
                TaskSummary { task, total_time }
            })
            .collect())
    }

    async fn update_task(&self, task: Task) -> TaskStoreResult<Task> {
        let mut tasks = self.tasks.write().await;
        if !tasks.contains_key(&task.id) {
            return Err(TaskStoreError::not_found("Task", task.id.to_string()));
        }
        tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn delete_task(&self, id: Uuid) -> TaskStoreResult<()> {
        let mut tasks = self.tasks.write().await;
        let mut logs = self.time_logs.write().await;
        if tasks.remove(&id).is_none() {
            return Err(TaskStoreError::not_found("Task", id.to_string()));
        }
        logs.retain(|_, log| log.task_id != id);
        Ok(())
    }

    // =========================================================================
    // Time log operations
    // =========================================================================

    async fn start_time_log(&self, log: TimeLog) -> TaskStoreResult<TimeLog> {
        let tasks = self.tasks.read().await;
        if !tasks.contains_key(&log.task_id) {
            return Err(TaskStoreError::not_found("Task", log.task_id.to_string()));
        }

        // Check and insert under one write guard so racing starts serialize.
        let mut logs = self.time_logs.write().await;
        if logs.values().any(|l| l.task_id == log.task_id && l.is_active()) {
            return Err(TaskStoreError::active_time_log(log.task_id));
        }
        logs.insert(log.id, log.clone());
        Ok(log)
    }

    async fn stop_time_log(
        &self,
        task_id: Uuid,
        end_time: DateTime<Utc>,
    ) -> TaskStoreResult<TimeLog> {
        let mut logs = self.time_logs.write().await;
        let active = logs
            .values_mut()
            .find(|l| l.task_id == task_id && l.is_active())
            .ok_or_else(|| TaskStoreError::not_found("Active time log", task_id.to_string()))?;

        let completed = active
            .complete(end_time)
            .ok_or_else(|| TaskStoreError::not_found("Active time log", task_id.to_string()))?;
        *active = completed.clone();
        Ok(completed)
    }

    async fn get_active_time_log(&self, task_id: Uuid) -> TaskStoreResult<Option<TimeLog>> {
        let logs = self.time_logs.read().await;
        Ok(logs
            .values()
            .find(|l| l.task_id == task_id && l.is_active())
            .cloned())
    }

    async fn list_time_logs(&self, filter: TimeLogFilter) -> TaskStoreResult<Vec<TimeLog>> {
        let logs = self.time_logs.read().await;
        let mut result: Vec<TimeLog> = logs
            .values()
            .filter(|l| matches_log(l, &filter))
            .cloned()
            .collect();
        result.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        Ok(result)
    }

    async fn total_time(&self, task_id: Uuid) -> TaskStoreResult<i64> {
        let logs = self.time_logs.read().await;
        Ok(entities::total_time(
            logs.values().filter(|l| l.task_id == task_id),
        ))
    }

    // =========================================================================
    // Maintenance
    // =========================================================================

    async fn counts(&self) -> TaskStoreResult<StoreCounts> {
        Ok(StoreCounts {
            users: self.users.read().await.len() as u64,
            tasks: self.tasks.read().await.len() as u64,
            logs: self.time_logs.read().await.len() as u64,
        })
    }

    async fn clear(&self) -> TaskStoreResult<()> {
        let mut users = self.users.write().await;
        let mut tasks = self.tasks.write().await;
        let mut logs = self.time_logs.write().await;
        logs.clear();
        tasks.clear();
        users.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use entities::TaskStatus;

    use super::*;

    async fn store_with_task() -> (MemoryTaskStore, User, Task) {
        let store = MemoryTaskStore::new();
        let user = store
            .create_user(User::new("alice@example.com", "Alice", "hash"))
            .await
            .unwrap();
        let task = store
            .create_task(Task::new(user.id, "Write project README"))
            .await
            .unwrap();
        (store, user, task)
    }

    #[tokio::test]
    async fn test_user_email_unique() {
        let store = MemoryTaskStore::new();
        store
            .create_user(User::new("bob@example.com", "Bob", "hash"))
            .await
            .unwrap();

        let result = store
            .create_user(User::new("bob@example.com", "Other Bob", "hash"))
            .await;
        assert!(matches!(result, Err(TaskStoreError::AlreadyExists { .. })));

        let found = store.get_user_by_email("bob@example.com").await.unwrap();
        assert_eq!(found.unwrap().name, "Bob");
    }

    #[tokio::test]
    async fn test_task_crud() {
        let (store, user, task) = store_with_task().await;

        let fetched = store.get_task(task.id).await.unwrap().unwrap();
        assert_eq!(fetched.title, "Write project README");

        let mut updated = fetched.clone();
        updated.status = TaskStatus::Completed;
        store.update_task(updated).await.unwrap();
        assert_eq!(
            store.get_task(task.id).await.unwrap().unwrap().status,
            TaskStatus::Completed
        );

        let listed = store.list_tasks(TaskFilter::owned_by(user.id)).await.unwrap();
        assert_eq!(listed.len(), 1);

        store.delete_task(task.id).await.unwrap();
        assert!(store.get_task(task.id).await.unwrap().is_none());
        assert!(store.delete_task(task.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_task_requires_existing_owner() {
        let store = MemoryTaskStore::new();
        let result = store.create_task(Task::new(Uuid::new_v4(), "Orphan")).await;
        assert!(result.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_list_tasks_newest_first_with_totals() {
        let (store, user, first) = store_with_task().await;
        let mut second = Task::new(user.id, "Fix login form validation");
        second.created_at = first.created_at + Duration::seconds(1);
        let second = store.create_task(second).await.unwrap();

        let t0 = Utc::now();
        store
            .start_time_log(TimeLog::start(first.id, user.id, t0))
            .await
            .unwrap();
        store
            .stop_time_log(first.id, t0 + Duration::seconds(30))
            .await
            .unwrap();
        store
            .start_time_log(TimeLog::start(first.id, user.id, t0))
            .await
            .unwrap();

        let listed = store.list_tasks(TaskFilter::owned_by(user.id)).await.unwrap();
        assert_eq!(listed[0].task.id, second.id);
        assert_eq!(listed[0].total_time, 0);
        assert_eq!(listed[1].task.id, first.id);
        assert_eq!(listed[1].total_time, 30);
    }

    #[tokio::test]
    async fn test_list_tasks_scoped_to_owner() {
        let (store, _alice, _task) = store_with_task().await;
        let bob = store
            .create_user(User::new("bob@example.com", "Bob", "hash"))
            .await
            .unwrap();

        let listed = store.list_tasks(TaskFilter::owned_by(bob.id)).await.unwrap();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn test_second_start_conflicts() {
        let (store, user, task) = store_with_task().await;
        let t0 = Utc::now();

        store
            .start_time_log(TimeLog::start(task.id, user.id, t0))
            .await
            .unwrap();
        let result = store
            .start_time_log(TimeLog::start(task.id, user.id, t0 + Duration::seconds(1)))
            .await;
        assert!(matches!(
            result,
            Err(TaskStoreError::ActiveTimeLogExists { .. })
        ));

        let stopped = store
            .stop_time_log(task.id, t0 + Duration::seconds(30))
            .await
            .unwrap();
        assert_eq!(stopped.duration, Some(30));
    }

    #[tokio::test]
    async fn test_stop_without_active_log() {
        let (store, user, task) = store_with_task().await;
        assert!(store
            .stop_time_log(task.id, Utc::now())
            .await
            .unwrap_err()
            .is_not_found());

        let t0 = Utc::now();
        store
            .start_time_log(TimeLog::start(task.id, user.id, t0))
            .await
            .unwrap();
        store.stop_time_log(task.id, t0).await.unwrap();
        assert!(store
            .stop_time_log(task.id, t0 + Duration::seconds(5))
            .await
            .unwrap_err()
            .is_not_found());
        assert_eq!(store.total_time(task.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_starts_single_winner() {
        let (store, user, task) = store_with_task().await;
        let (task_id, user_id) = (task.id, user.id);

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .start_time_log(TimeLog::start(task_id, user_id, Utc::now()))
                        .await
                })
            })
            .collect();

        let mut wins = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => wins += 1,
                Err(TaskStoreError::ActiveTimeLogExists { .. }) => conflicts += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(wins, 1);
        assert_eq!(conflicts, 15);

        let active = store
            .list_time_logs(TimeLogFilter {
                task_id: Some(task.id),
                active_only: true,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_task_cancels_active_timer() {
        let (store, user, task) = store_with_task().await;
        store
            .start_time_log(TimeLog::start(task.id, user.id, Utc::now()))
            .await
            .unwrap();

        store.delete_task(task.id).await.unwrap();

        assert!(store.get_active_time_log(task.id).await.unwrap().is_none());
        assert_eq!(store.counts().await.unwrap().logs, 0);
    }

    #[tokio::test]
    async fn test_counts_and_clear() {
        let (store, user, task) = store_with_task().await;
        store
            .start_time_log(TimeLog::start(task.id, user.id, Utc::now()))
            .await
            .unwrap();

        assert_eq!(
            store.counts().await.unwrap(),
            StoreCounts {
                users: 1,
                tasks: 1,
                logs: 1
            }
        );

        store.clear().await.unwrap();
        assert_eq!(store.counts().await.unwrap(), StoreCounts::default());
    }
}
