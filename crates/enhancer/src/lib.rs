//! Task text enhancement for Tasktime.
//!
//! Sends free-text task input to an OpenAI-compatible chat completion API
//! and turns the reply into a [`TaskDraft`]. Every failure path degrades to
//! a deterministic offline draft, so callers never see an error.

mod client;
mod draft;
mod error;

pub use client::*;
pub use draft::*;
pub use error::*;

/// Default chat completion endpoint base.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default chat model.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Instruction sent as the system message.
pub const SYSTEM_PROMPT: &str = "You are a task management assistant. Given a user's natural language task input, generate a clear, concise task title and a structured description. Return only a JSON object with \"title\" and \"description\" fields.";
