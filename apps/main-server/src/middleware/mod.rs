//! Request middleware.

pub mod auth;

pub use self::auth::{auth_middleware, AuthenticatedUser, CurrentUser};
