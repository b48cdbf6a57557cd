//! Per-view timer board.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use entities::{elapsed_seconds, TimeLog};
use serde::Serialize;
use uuid::Uuid;

/// A running timer shown on a board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedTimer {
    pub time_log_id: Uuid,
    pub start_time: DateTime<Utc>,
    /// Seconds elapsed at the last refresh.
    pub last_known_elapsed: i64,
}

/// Elapsed seconds per task at a point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSnapshot {
    pub taken_at: Option<DateTime<Utc>>,
    pub elapsed: BTreeMap<Uuid, i64>,
}

/// Active timers keyed by task id.
///
/// Elapsed time is always recomputed from `start_time`, never accumulated,
/// so a late or skipped refresh cannot drift.
#[derive(Debug, Clone, Default)]
pub struct TimerBoard {
    timers: HashMap<Uuid, TrackedTimer>,
}

impl TimerBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts showing an active log. Completed logs are ignored.
    ///
    /// Returns true if the log is now tracked.
    pub fn track(&mut self, log: &TimeLog, now: DateTime<Utc>) -> bool {
        if !log.is_active() {
            return false;
        }
        self.timers.insert(
            log.task_id,
            TrackedTimer {
                time_log_id: log.id,
                start_time: log.start_time,
                last_known_elapsed: elapsed_seconds(log.start_time, now),
            },
        );
        true
    }

    pub fn untrack(&mut self, task_id: Uuid) -> Option<TrackedTimer> {
        self.timers.remove(&task_id)
    }

    pub fn get(&self, task_id: Uuid) -> Option<&TrackedTimer> {
        self.timers.get(&task_id)
    }

    /// Seconds the task's timer has been running as of `now`.
    pub fn elapsed(&self, task_id: Uuid, now: DateTime<Utc>) -> Option<i64> {
        self.timers
            .get(&task_id)
            .map(|timer| elapsed_seconds(timer.start_time, now))
    }

    /// Recomputes every `last_known_elapsed` and returns the result.
    pub fn refresh(&mut self, now: DateTime<Utc>) -> BoardSnapshot {
        for timer in self.timers.values_mut() {
            timer.last_known_elapsed = elapsed_seconds(timer.start_time, now);
        }
        BoardSnapshot {
            taken_at: Some(now),
            elapsed: self
                .timers
                .iter()
                .map(|(task_id, timer)| (*task_id, timer.last_known_elapsed))
                .collect(),
        }
    }

    /// Replaces the board contents with the server's active timers.
    pub fn sync_active<'a>(
        &mut self,
        logs: impl IntoIterator<Item = &'a TimeLog>,
        now: DateTime<Utc>,
    ) {
        self.timers.clear();
        for log in logs {
            self.track(log, now);
        }
        tracing::debug!(tracked = self.timers.len(), "Timer board synced");
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn active(start: DateTime<Utc>) -> TimeLog {
        TimeLog::start(Uuid::new_v4(), Uuid::new_v4(), start)
    }

    #[test]
    fn test_track_and_elapsed() {
        let t0 = Utc::now();
        let log = active(t0);
        let mut board = TimerBoard::new();

        assert!(board.track(&log, t0 + Duration::seconds(3)));
        assert_eq!(board.get(log.task_id).unwrap().last_known_elapsed, 3);
        assert_eq!(board.elapsed(log.task_id, t0 + Duration::milliseconds(61_500)), Some(61));
        assert_eq!(board.elapsed(Uuid::new_v4(), t0), None);
    }

    #[test]
    fn test_completed_logs_are_not_tracked() {
        let t0 = Utc::now();
        let done = active(t0).complete(t0 + Duration::seconds(5)).unwrap();
        let mut board = TimerBoard::new();

        assert!(!board.track(&done, t0));
        assert!(board.is_empty());
    }

    #[test]
    fn test_refresh_recomputes_from_start() {
        let t0 = Utc::now();
        let log = active(t0);
        let mut board = TimerBoard::new();
        board.track(&log, t0);

        board.refresh(t0 + Duration::seconds(100));
        // Going back in time must not leave a stale larger value.
        let snapshot = board.refresh(t0 + Duration::seconds(10));

        assert_eq!(snapshot.elapsed.get(&log.task_id), Some(&10));
        assert_eq!(snapshot.taken_at, Some(t0 + Duration::seconds(10)));
    }

    #[test]
    fn test_untrack() {
        let t0 = Utc::now();
        let log = active(t0);
        let mut board = TimerBoard::new();
        board.track(&log, t0);

        let removed = board.untrack(log.task_id).unwrap();
        assert_eq!(removed.time_log_id, log.id);
        assert!(board.untrack(log.task_id).is_none());
    }

    #[test]
    fn test_sync_active_replaces_contents() {
        let t0 = Utc::now();
        let stale = active(t0);
        let mut board = TimerBoard::new();
        board.track(&stale, t0);

        let a = active(t0 - Duration::seconds(30));
        let b = active(t0 - Duration::seconds(5));
        board.sync_active([&a, &b], t0);

        assert_eq!(board.len(), 2);
        assert!(board.get(stale.task_id).is_none());
        assert_eq!(board.elapsed(a.task_id, t0), Some(30));
        assert_eq!(board.elapsed(b.task_id, t0), Some(5));
    }
}
