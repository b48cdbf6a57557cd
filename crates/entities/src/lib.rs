//! Core entity definitions for Tasktime.
//!
//! This crate defines the data types shared by the store, the server and
//! clients: users, tasks and the time logs recorded against them.

mod task;
mod time_log;
mod timestamp;
mod user;

pub use task::*;
pub use time_log::*;
pub use timestamp::*;
pub use user::*;
