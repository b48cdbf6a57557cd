//! Business logic behind the HTTP handlers.

pub mod accounts;
pub mod clock;
pub mod tasks;
pub mod timer;
