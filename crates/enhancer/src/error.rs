//! Enhancement error types.
//!
//! These never leave the crate's public `enhance` call; they are logged and
//! turned into a fallback draft.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnhanceError {
    /// Transport, timeout or body decoding failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The reply had no `choices[0].message.content`.
    #[error("Completion has no content")]
    MissingContent,
}

pub type EnhanceResult<T> = Result<T, EnhanceError>;
