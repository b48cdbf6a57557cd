//! HTTP API definitions for Tasktime server/client communication
//!
//! This crate defines the JSON bodies exchanged over the Tasktime HTTP API,
//! the error envelope and its codes, and the field validation shared by the
//! server and clients.

mod error;
mod requests;
mod responses;

pub use error::*;
pub use requests::*;
pub use responses::*;
