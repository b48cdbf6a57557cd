//! Task and time log storage for Tasktime
//!
//! This crate provides a storage abstraction for users, tasks and time logs.
//! It ships an in-memory store (tests, ephemeral runs) and a SQLite store
//! backed by sqlx. Both enforce that a task has at most one active time log.

mod error;
mod memory;
mod sqlite;
mod traits;

pub use error::*;
pub use memory::*;
pub use sqlite::*;
pub use traits::*;
