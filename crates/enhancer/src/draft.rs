//! Draft types and the pure parts of enhancement.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A proposed task title and description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
}

impl TaskDraft {
    /// The offline draft: input with its first letter capitalized.
    pub fn fallback(user_input: &str) -> Self {
        Self {
            title: capitalize_first(user_input),
            description: None,
        }
    }
}

/// Outcome of an enhancement attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Enhancement {
    /// The completion API produced the draft.
    Enhanced(TaskDraft),
    /// The API was not configured or failed.
    Fallback(TaskDraft),
}

impl Enhancement {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }

    pub fn into_draft(self) -> TaskDraft {
        match self {
            Self::Enhanced(draft) | Self::Fallback(draft) => draft,
        }
    }
}

/// Uppercases the first character and leaves the rest untouched.
pub fn capitalize_first(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn non_empty_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Builds a draft from a completion's message content.
///
/// JSON content supplies `title` and `description`, each optional. Anything
/// else becomes the title verbatim (trimmed).
pub fn parse_content(content: &str, user_input: &str) -> TaskDraft {
    match serde_json::from_str::<Value>(content) {
        Ok(parsed) => TaskDraft {
            title: non_empty_text(parsed.get("title"))
                .unwrap_or_else(|| user_input.to_string()),
            description: non_empty_text(parsed.get("description")),
        },
        Err(_) => {
            let title = content.trim();
            if title.is_empty() {
                TaskDraft::fallback(user_input)
            } else {
                TaskDraft {
                    title: title.to_string(),
                    description: None,
                }
            }
        }
    }
}
