//! Periodic board refresh.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::{BoardSnapshot, TimerBoard};

/// Default redraw period.
pub const DEFAULT_REDRAW_PERIOD: Duration = Duration::from_secs(1);

/// A board shared between a view and its redraw loop.
pub type SharedBoard = Arc<RwLock<TimerBoard>>;

/// Background task that refreshes a board every period and publishes the
/// result.
///
/// The task is aborted by [`RedrawLoop::stop`] or when the loop is dropped.
#[derive(Debug)]
pub struct RedrawLoop {
    handle: Option<JoinHandle<()>>,
    snapshots: watch::Receiver<BoardSnapshot>,
}

impl RedrawLoop {
    /// Spawns the loop on the current tokio runtime.
    pub fn start(board: SharedBoard, period: Duration) -> Self {
        let (tx, rx) = watch::channel(BoardSnapshot::default());

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                interval.tick().await;
                let snapshot = board.write().await.refresh(Utc::now());
                if tx.send(snapshot).is_err() {
                    tracing::debug!("No snapshot receivers left, redraw loop exiting");
                    break;
                }
            }
        });

        Self {
            handle: Some(handle),
            snapshots: rx,
        }
    }

    /// Returns a receiver for published snapshots.
    pub fn subscribe(&self) -> watch::Receiver<BoardSnapshot> {
        self.snapshots.clone()
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Aborts the background task. Safe to call more than once.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for RedrawLoop {
    fn drop(&mut self) {
        self.stop();
    }
}
