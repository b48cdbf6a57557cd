//! API response types.

use entities::{Task, TaskSummary, TimeLog, User};
use serde::{Deserialize, Serialize};

// ============================================================================
// Auth Responses
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeResponse {
    pub user: User,
}

// ============================================================================
// Task Responses
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResponse {
    pub task: TaskSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTaskResponse {
    pub task: Task,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListTasksResponse {
    pub tasks: Vec<TaskSummary>,
}

// ============================================================================
// Timer Responses
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeLogResponse {
    pub time_log: TimeLog,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTimeLogsResponse {
    pub time_logs: Vec<TimeLog>,
    pub total_time: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveTimersResponse {
    pub time_logs: Vec<TimeLog>,
}

// ============================================================================
// Enhancement Responses
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnhanceResponse {
    pub title: String,
    pub description: Option<String>,
}
