//! Time log entity definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::truncate_timestamp;

/// A span of time recorded against a task.
///
/// A log is *active* while `end_time` is `None`. Stopping it sets `end_time`
/// and `duration` once; both are immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeLog {
    /// Unique identifier.
    pub id: Uuid,
    /// Task this log belongs to.
    pub task_id: Uuid,
    /// User who started the timer.
    pub user_id: Uuid,
    /// When the timer started.
    pub start_time: DateTime<Utc>,
    /// When the timer stopped.
    pub end_time: Option<DateTime<Utc>>,
    /// Whole seconds between start and end, set on stop.
    pub duration: Option<i64>,
}

impl TimeLog {
    /// Creates a new active log.
    pub fn start(task_id: Uuid, user_id: Uuid, start_time: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            task_id,
            user_id,
            start_time: truncate_timestamp(start_time),
            end_time: None,
            duration: None,
        }
    }

    /// Returns true while the timer is running.
    pub fn is_active(&self) -> bool {
        self.end_time.is_none()
    }

    /// Completes the log at `end_time`.
    ///
    /// Returns `None` if the log was already completed.
    pub fn complete(&self, end_time: DateTime<Utc>) -> Option<TimeLog> {
        if !self.is_active() {
            return None;
        }
        let end_time = truncate_timestamp(end_time);
        Some(TimeLog {
            end_time: Some(end_time),
            duration: Some(elapsed_seconds(self.start_time, end_time)),
            ..self.clone()
        })
    }

    /// Seconds elapsed as of `now`: the stored duration once completed,
    /// otherwise recomputed from the start time.
    pub fn elapsed_at(&self, now: DateTime<Utc>) -> i64 {
        match self.duration {
            Some(duration) => duration,
            None => elapsed_seconds(self.start_time, now),
        }
    }
}

/// Whole seconds from `start` to `end`, rounded down and never negative.
pub fn elapsed_seconds(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    (end - start).num_milliseconds().max(0) / 1000
}

/// Sums the durations of completed logs. Active logs contribute nothing.
pub fn total_time<'a>(logs: impl IntoIterator<Item = &'a TimeLog>) -> i64 {
    logs.into_iter().filter_map(|log| log.duration).sum()
}
