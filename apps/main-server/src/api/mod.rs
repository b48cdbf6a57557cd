//! API endpoints.

pub mod auth;
pub mod enhance;
pub mod task;
pub mod timer;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use task_store::TaskStore;

use crate::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router<S: TaskStore + 'static>() -> Router<Arc<AppState<S>>> {
    Router::new()
        // Auth endpoints
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/me", get(auth::me))
        // Task endpoints
        .route("/api/tasks", get(task::list_tasks).post(task::create_task))
        .route("/api/tasks/ai-enhance", post(enhance::enhance_task))
        .route(
            "/api/tasks/{id}",
            get(task::get_task)
                .patch(task::update_task)
                .delete(task::delete_task),
        )
        // Timer endpoints
        .route("/api/tasks/{id}/timer/start", post(timer::start_timer))
        .route("/api/tasks/{id}/timer/stop", post(timer::stop_timer))
        .route("/api/tasks/{id}/time-logs", get(timer::list_time_logs))
        .route("/api/timers/active", get(timer::list_active_timers))
        // Health check
        .route("/health", get(health_check))
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
