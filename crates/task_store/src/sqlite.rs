//! SQLite task store implementation.
//!
//! Ids are stored as TEXT UUIDs and timestamps as fixed-width RFC 3339 TEXT
//! so that lexical ordering matches chronological ordering.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use entities::{Task, TaskStatus, TaskSummary, TimeLog, User};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    FromRow, Pool, QueryBuilder, Sqlite,
};
use uuid::Uuid;

use crate::{
    StoreCounts, TaskFilter, TaskStore, TaskStoreError, TaskStoreResult, TimeLogFilter,
};

/// Schema applied on startup. Every statement is idempotent.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY NOT NULL,
    email TEXT NOT NULL UNIQUE,
    password TEXT NOT NULL,
    name TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS tasks (
    id TEXT PRIMARY KEY NOT NULL,
    title TEXT NOT NULL CHECK (length(title) > 0),
    description TEXT,
    status TEXT NOT NULL DEFAULT 'PENDING'
        CHECK (status IN ('PENDING', 'IN_PROGRESS', 'COMPLETED')),
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_tasks_user_created ON tasks (user_id, created_at);

CREATE TABLE IF NOT EXISTS time_logs (
    id TEXT PRIMARY KEY NOT NULL,
    task_id TEXT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    start_time TEXT NOT NULL,
    end_time TEXT,
    duration INTEGER CHECK (duration IS NULL OR duration >= 0)
);

CREATE INDEX IF NOT EXISTS idx_time_logs_task ON time_logs (task_id);

CREATE UNIQUE INDEX IF NOT EXISTS idx_time_logs_one_active
    ON time_logs (task_id) WHERE end_time IS NULL;
"#;

const TIME_LOG_COLUMNS: &str = "id, task_id, user_id, start_time, end_time, duration";

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(value: &str) -> TaskStoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| TaskStoreError::InvalidData(format!("timestamp '{}': {}", value, e)))
}

fn parse_uuid(value: &str) -> TaskStoreResult<Uuid> {
    value
        .parse()
        .map_err(|e| TaskStoreError::InvalidData(format!("uuid '{}': {}", value, e)))
}

/// Database row for User
#[derive(Debug, FromRow)]
struct UserRow {
    id: String,
    email: String,
    password: String,
    name: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<UserRow> for User {
    type Error = TaskStoreError;

    fn try_from(row: UserRow) -> TaskStoreResult<Self> {
        Ok(User {
            id: parse_uuid(&row.id)?,
            email: row.email,
            name: row.name,
            password_hash: row.password,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

/// Database row for Task, with the aggregated total of its completed logs.
#[derive(Debug, FromRow)]
struct TaskRow {
    id: String,
    title: String,
    description: Option<String>,
    status: String,
    user_id: String,
    created_at: String,
    updated_at: String,
    total_time: i64,
}

impl TryFrom<TaskRow> for TaskSummary {
    type Error = TaskStoreError;

    fn try_from(row: TaskRow) -> TaskStoreResult<Self> {
        let status = TaskStatus::from_str(&row.status)
            .map_err(|e| TaskStoreError::InvalidData(e.to_string()))?;
        Ok(TaskSummary {
            task: Task {
                id: parse_uuid(&row.id)?,
                title: row.title,
                description: row.description,
                status,
                owner_id: parse_uuid(&row.user_id)?,
                created_at: parse_timestamp(&row.created_at)?,
                updated_at: parse_timestamp(&row.updated_at)?,
            },
            total_time: row.total_time,
        })
    }
}

/// Database row for TimeLog
#[derive(Debug, FromRow)]
struct TimeLogRow {
    id: String,
    task_id: String,
    user_id: String,
    start_time: String,
    end_time: Option<String>,
    duration: Option<i64>,
}

impl TryFrom<TimeLogRow> for TimeLog {
    type Error = TaskStoreError;

    fn try_from(row: TimeLogRow) -> TaskStoreResult<Self> {
        Ok(TimeLog {
            id: parse_uuid(&row.id)?,
            task_id: parse_uuid(&row.task_id)?,
            user_id: parse_uuid(&row.user_id)?,
            start_time: parse_timestamp(&row.start_time)?,
            end_time: row.end_time.as_deref().map(parse_timestamp).transpose()?,
            duration: row.duration,
        })
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|e| e.is_unique_violation())
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|e| e.is_foreign_key_violation())
}

/// SQLite-backed task store.
#[derive(Debug, Clone)]
pub struct SqliteTaskStore {
    pool: Pool<Sqlite>,
}

impl SqliteTaskStore {
    /// Connects to `database_url` and applies the schema.
    ///
    /// In-memory databases are pinned to a single long-lived connection so
    /// every query sees the same data.
    pub async fn connect(database_url: &str) -> TaskStoreResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options.connect_with(options).await?;
        let store = Self { pool };
        store.init_schema().await?;

        tracing::info!(in_memory, "SQLite task store ready");
        Ok(store)
    }

    /// Returns a reference to the connection pool
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Applies the schema.
    pub async fn init_schema(&self) -> TaskStoreResult<()> {
        sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }

    async fn count(&self, table: &'static str) -> TaskStoreResult<u64> {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}

#[async_trait]
impl TaskStore for SqliteTaskStore {
    // =========================================================================
    // User operations
    // =========================================================================

    async fn create_user(&self, user: User) -> TaskStoreResult<User> {
        sqlx::query(
            "INSERT INTO users (id, email, password, name, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(user.id.to_string())
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(format_timestamp(user.created_at))
        .bind(format_timestamp(user.updated_at))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                TaskStoreError::already_exists("User", user.email.clone())
            } else {
                e.into()
            }
        })?;

        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> TaskStoreResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, email, password, name, created_at, updated_at FROM users WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn get_user_by_email(&self, email: &str) -> TaskStoreResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, email, password, name, created_at, updated_at FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    // =========================================================================
    // Task operations
    // =========================================================================

    async fn create_task(&self, task: Task) -> TaskStoreResult<Task> {
        sqlx::query(
            "INSERT INTO tasks (id, title, description, status, user_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(task.id.to_string())
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status.as_str())
        .bind(task.owner_id.to_string())
        .bind(format_timestamp(task.created_at))
        .bind(format_timestamp(task.updated_at))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                TaskStoreError::not_found("User", task.owner_id.to_string())
            } else if is_unique_violation(&e) {
                TaskStoreError::already_exists("Task", task.id.to_string())
            } else {
                e.into()
            }
        })?;

        Ok(task)
    }

    async fn get_task(&self, id: Uuid) -> TaskStoreResult<Option<Task>> {
        let row: Option<TaskRow> = sqlx::query_as(
            "SELECT id, title, description, status, user_id, created_at, updated_at,
                    0 AS total_time
             FROM tasks
             WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(TaskSummary::try_from).transpose()?.map(|s| s.task))
    }

    async fn list_tasks(&self, filter: TaskFilter) -> TaskStoreResult<Vec<TaskSummary>> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT t.id, t.title, t.description, t.status, t.user_id, t.created_at, \
             t.updated_at, COALESCE(SUM(l.duration), 0) AS total_time
             FROM tasks t
             LEFT JOIN time_logs l ON l.task_id = t.id AND l.end_time IS NOT NULL
             WHERE 1 = 1",
        );
        if let Some(owner_id) = filter.owner_id {
            query.push(" AND t.user_id = ").push_bind(owner_id.to_string());
        }
        query.push(" GROUP BY t.id ORDER BY t.created_at DESC");

        let rows = query.build_query_as::<TaskRow>().fetch_all(&self.pool).await?;
        rows.into_iter().map(TaskSummary::try_from).collect()
    }

    async fn update_task(&self, task: Task) -> TaskStoreResult<Task> {
        let result = sqlx::query(
            "UPDATE tasks SET title = ?, description = ?, status = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status.as_str())
        .bind(format_timestamp(task.updated_at))
        .bind(task.id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(TaskStoreError::not_found("Task", task.id.to_string()));
        }
        Ok(task)
    }

    async fn delete_task(&self, id: Uuid) -> TaskStoreResult<()> {
        let mut tx = self.pool.begin().await?;

        let removed_logs = sqlx::query("DELETE FROM time_logs WHERE task_id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(TaskStoreError::not_found("Task", id.to_string()));
        }
        tx.commit().await?;

        tracing::debug!(task_id = %id, removed_logs, "Task deleted");
        Ok(())
    }

    // =========================================================================
    // Time log operations
    // =========================================================================

    async fn start_time_log(&self, log: TimeLog) -> TaskStoreResult<TimeLog> {
        // The partial unique index decides between racing inserts.
        sqlx::query(
            "INSERT INTO time_logs (id, task_id, user_id, start_time, end_time, duration)
             VALUES (?, ?, ?, ?, NULL, NULL)",
        )
        .bind(log.id.to_string())
        .bind(log.task_id.to_string())
        .bind(log.user_id.to_string())
        .bind(format_timestamp(log.start_time))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                TaskStoreError::active_time_log(log.task_id)
            } else if is_foreign_key_violation(&e) {
                TaskStoreError::not_found("Task", log.task_id.to_string())
            } else {
                e.into()
            }
        })?;

        Ok(log)
    }

    async fn stop_time_log(
        &self,
        task_id: Uuid,
        end_time: DateTime<Utc>,
    ) -> TaskStoreResult<TimeLog> {
        let active = self
            .get_active_time_log(task_id)
            .await?
            .ok_or_else(|| TaskStoreError::not_found("Active time log", task_id.to_string()))?;

        let completed = active
            .complete(end_time)
            .ok_or_else(|| TaskStoreError::not_found("Active time log", task_id.to_string()))?;

        // Only the first writer flips the row; a concurrent stop sees zero rows.
        let result = sqlx::query(
            "UPDATE time_logs SET end_time = ?, duration = ? WHERE id = ? AND end_time IS NULL",
        )
        .bind(completed.end_time.map(format_timestamp))
        .bind(completed.duration)
        .bind(completed.id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(TaskStoreError::not_found(
                "Active time log",
                task_id.to_string(),
            ));
        }
        Ok(completed)
    }

    async fn get_active_time_log(&self, task_id: Uuid) -> TaskStoreResult<Option<TimeLog>> {
        let row: Option<TimeLogRow> = sqlx::query_as(&format!(
            "SELECT {} FROM time_logs WHERE task_id = ? AND end_time IS NULL",
            TIME_LOG_COLUMNS
        ))
        .bind(task_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(TimeLog::try_from).transpose()
    }

    async fn list_time_logs(&self, filter: TimeLogFilter) -> TaskStoreResult<Vec<TimeLog>> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {} FROM time_logs WHERE 1 = 1",
            TIME_LOG_COLUMNS
        ));
        if let Some(task_id) = filter.task_id {
            query.push(" AND task_id = ").push_bind(task_id.to_string());
        }
        if let Some(user_id) = filter.user_id {
            query.push(" AND user_id = ").push_bind(user_id.to_string());
        }
        if filter.active_only {
            query.push(" AND end_time IS NULL");
        }
        query.push(" ORDER BY start_time DESC");

        let rows = query.build_query_as::<TimeLogRow>().fetch_all(&self.pool).await?;
        rows.into_iter().map(TimeLog::try_from).collect()
    }

    async fn total_time(&self, task_id: Uuid) -> TaskStoreResult<i64> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(duration), 0) FROM time_logs
             WHERE task_id = ? AND end_time IS NOT NULL",
        )
        .bind(task_id.to_string())
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    // =========================================================================
    // Maintenance
    // =========================================================================

    async fn counts(&self) -> TaskStoreResult<StoreCounts> {
        Ok(StoreCounts {
            users: self.count("users").await?,
            tasks: self.count("tasks").await?,
            logs: self.count("time_logs").await?,
        })
    }

    async fn clear(&self) -> TaskStoreResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM time_logs").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM tasks").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM users").execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(())
    }
}
