//! Running timer display model for Tasktime clients.
//!
//! A [`TimerBoard`] belongs to one view and tracks the active timers shown
//! in it. A [`RedrawLoop`] refreshes the board once per period and publishes
//! snapshots; dropping or stopping the loop ends the background task.

mod board;
mod redraw;

pub use board::*;
pub use redraw::*;
