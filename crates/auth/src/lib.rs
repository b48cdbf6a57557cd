//! JWT and password authentication for Tasktime.
//!
//! This crate provides:
//! - JWT token generation and validation
//! - Argon2id password hashing and verification

mod error;
mod jwt;
mod password;

pub use error::*;
pub use jwt::*;
pub use password::*;

/// Default JWT expiration time in hours.
pub const DEFAULT_JWT_EXPIRATION_HOURS: u64 = 24;

/// Default JWT issuer.
pub const DEFAULT_JWT_ISSUER: &str = "tasktime";

/// Minimum accepted password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;
