//! Task store trait definitions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use entities::{Task, TaskSummary, TimeLog, User};
use uuid::Uuid;

use crate::TaskStoreResult;

/// Filter options for listing tasks.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// Filter by owning user.
    pub owner_id: Option<Uuid>,
}

impl TaskFilter {
    /// Filter matching every task owned by `owner_id`.
    pub fn owned_by(owner_id: Uuid) -> Self {
        Self {
            owner_id: Some(owner_id),
        }
    }
}

/// Filter options for listing time logs.
#[derive(Debug, Clone, Default)]
pub struct TimeLogFilter {
    /// Filter by task.
    pub task_id: Option<Uuid>,
    /// Filter by the user who started the timer.
    pub user_id: Option<Uuid>,
    /// Only return logs whose timer is still running.
    pub active_only: bool,
}

/// Row counts per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct StoreCounts {
    pub users: u64,
    pub tasks: u64,
    pub logs: u64,
}

/// Trait for task storage operations.
///
/// Implementations must guarantee that at most one time log with no end time
/// exists per task, even under concurrent `start_time_log` calls.
#[async_trait]
pub trait TaskStore: Send + Sync {
    // =========================================================================
    // User operations
    // =========================================================================

    /// Creates a new user. Fails with `AlreadyExists` on a duplicate email.
    async fn create_user(&self, user: User) -> TaskStoreResult<User>;

    /// Gets a user by ID.
    async fn get_user(&self, id: Uuid) -> TaskStoreResult<Option<User>>;

    /// Gets a user by email.
    async fn get_user_by_email(&self, email: &str) -> TaskStoreResult<Option<User>>;

    // =========================================================================
    // Task operations
    // =========================================================================

    /// Creates a new task.
    async fn create_task(&self, task: Task) -> TaskStoreResult<Task>;

    /// Gets a task by ID.
    async fn get_task(&self, id: Uuid) -> TaskStoreResult<Option<Task>>;

    /// Lists tasks newest first, each with the total of its completed logs.
    async fn list_tasks(&self, filter: TaskFilter) -> TaskStoreResult<Vec<TaskSummary>>;

    /// Updates a task.
    async fn update_task(&self, task: Task) -> TaskStoreResult<Task>;

    /// Deletes a task together with all of its time logs, active or not.
    async fn delete_task(&self, id: Uuid) -> TaskStoreResult<()>;

    // =========================================================================
    // Time log operations
    // =========================================================================

    /// Inserts an active time log.
    ///
    /// Fails with `ActiveTimeLogExists` if the task already has one and with
    /// `NotFound` if the task does not exist.
    async fn start_time_log(&self, log: TimeLog) -> TaskStoreResult<TimeLog>;

    /// Completes the active time log of a task at `end_time`.
    ///
    /// Fails with `NotFound` if no timer is running.
    async fn stop_time_log(&self, task_id: Uuid, end_time: DateTime<Utc>)
        -> TaskStoreResult<TimeLog>;

    /// Gets the active time log of a task, if any.
    async fn get_active_time_log(&self, task_id: Uuid) -> TaskStoreResult<Option<TimeLog>>;

    /// Lists time logs newest first.
    async fn list_time_logs(&self, filter: TimeLogFilter) -> TaskStoreResult<Vec<TimeLog>>;

    /// Sums the durations of a task's completed time logs.
    async fn total_time(&self, task_id: Uuid) -> TaskStoreResult<i64>;

    // =========================================================================
    // Maintenance
    // =========================================================================

    /// Returns row counts for every table.
    async fn counts(&self) -> TaskStoreResult<StoreCounts>;

    /// Removes every row. Used when reseeding demo data.
    async fn clear(&self) -> TaskStoreResult<()>;
}
