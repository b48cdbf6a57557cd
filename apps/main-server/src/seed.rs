//! Demo data for local development.

use chrono::{DateTime, Duration, Utc};
use entities::{Task, TaskStatus, TimeLog, User};
use task_store::{StoreCounts, TaskStore};

use crate::error::ServerResult;

/// Password shared by the demo accounts.
pub const DEMO_PASSWORD: &str = "password123";

async fn demo_user<S: TaskStore + ?Sized>(store: &S, email: &str, name: &str) -> ServerResult<User> {
    let password_hash = ::auth::hash_password(DEMO_PASSWORD)?;
    Ok(store.create_user(User::new(email, name, password_hash)).await?)
}

async fn completed_log<S: TaskStore + ?Sized>(
    store: &S,
    task: &Task,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> ServerResult<()> {
    store
        .start_time_log(TimeLog::start(task.id, task.owner_id, start))
        .await?;
    store.stop_time_log(task.id, end).await?;
    Ok(())
}

/// Wipes the store and loads two users with a few tasks and time logs,
/// including one running timer. Returns the resulting row counts.
pub async fn seed_demo_data<S: TaskStore + ?Sized>(
    store: &S,
    now: DateTime<Utc>,
) -> ServerResult<StoreCounts> {
    store.clear().await?;

    let alice = demo_user(store, "alice@example.com", "Alice").await?;
    let bob = demo_user(store, "bob@example.com", "Bob").await?;

    let readme = store
        .create_task(
            Task::new(alice.id, "Write project README")
                .with_description("Draft and refine documentation")
                .with_status(TaskStatus::InProgress),
        )
        .await?;
    store
        .create_task(
            Task::new(alice.id, "Fix login form validation")
                .with_description("Ensure proper error messages and field checks"),
        )
        .await?;
    let stop_logic = store
        .create_task(
            Task::new(bob.id, "Implement time tracking stop logic")
                .with_description("Compute duration and persist end time")
                .with_status(TaskStatus::Completed),
        )
        .await?;
    let summary = store
        .create_task(
            Task::new(bob.id, "Design daily summary layout")
                .with_description("Components for totals and logs")
                .with_status(TaskStatus::InProgress),
        )
        .await?;

    completed_log(store, &readme, now - Duration::hours(1), now - Duration::minutes(20)).await?;
    completed_log(
        store,
        &stop_logic,
        now - Duration::hours(2),
        now - Duration::minutes(90),
    )
    .await?;
    store
        .start_time_log(TimeLog::start(summary.id, bob.id, now - Duration::minutes(10)))
        .await?;

    let counts = store.counts().await?;
    tracing::info!(
        users = counts.users,
        tasks = counts.tasks,
        logs = counts.logs,
        "Demo data seeded"
    );
    Ok(counts)
}
