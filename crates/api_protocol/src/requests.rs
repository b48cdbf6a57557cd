//! API request types and their field validation.
//!
//! Fields arrive as loosely typed options so that a bad value produces a
//! per-field message instead of a generic body rejection.

use entities::{TaskPatch, TaskStatus};
use serde::{Deserialize, Deserializer, Serialize};

use crate::FieldError;

/// Keeps `null` distinct from an absent field.
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn validate_title(title: Option<&str>, errors: &mut Vec<FieldError>) -> Option<String> {
    match title.map(str::trim) {
        Some(title) if !title.is_empty() => Some(title.to_string()),
        _ => {
            errors.push(FieldError::new("title", "Title is required"));
            None
        }
    }
}

/// An absent status is `None`; an explicit `null` is an error, not the default.
fn validate_status(
    status: Option<Option<&str>>,
    errors: &mut Vec<FieldError>,
) -> Option<TaskStatus> {
    let Some(status) = status? else {
        errors.push(FieldError::new("status", "Status must not be null"));
        return None;
    };
    match status.parse() {
        Ok(status) => Some(status),
        Err(e) => {
            errors.push(FieldError::new("status", e.to_string()));
            None
        }
    }
}

/// Empty descriptions are stored as null.
fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

// ============================================================================
// Auth Requests
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

/// A registration that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl RegisterRequest {
    pub fn validate(self, min_password_length: usize) -> Result<Registration, Vec<FieldError>> {
        let mut errors = Vec::new();

        let email = self.email.map(|e| e.trim().to_lowercase()).unwrap_or_default();
        if !email.contains('@') {
            errors.push(FieldError::new("email", "A valid email is required"));
        }

        let password = self.password.unwrap_or_default();
        if password.chars().count() < min_password_length {
            errors.push(FieldError::new(
                "password",
                format!("Password must be at least {} characters", min_password_length),
            ));
        }

        let name = self.name.map(|n| n.trim().to_string()).unwrap_or_default();
        if name.is_empty() {
            errors.push(FieldError::new("name", "Name is required"));
        }

        if errors.is_empty() {
            Ok(Registration {
                email,
                password,
                name,
            })
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    /// Returns the normalized `(email, password)` pair.
    pub fn validate(self) -> Result<(String, String), Vec<FieldError>> {
        let mut errors = Vec::new();
        let email = self.email.map(|e| e.trim().to_lowercase()).unwrap_or_default();
        if email.is_empty() {
            errors.push(FieldError::new("email", "Email is required"));
        }
        let password = self.password.unwrap_or_default();
        if password.is_empty() {
            errors.push(FieldError::new("password", "Password is required"));
        }

        if errors.is_empty() {
            Ok((email, password))
        } else {
            Err(errors)
        }
    }
}

// ============================================================================
// Task Requests
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub status: Option<Option<String>>,
}

/// A task creation that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
}

impl CreateTaskRequest {
    pub fn validate(self) -> Result<NewTask, Vec<FieldError>> {
        let mut errors = Vec::new();
        let title = validate_title(self.title.as_deref(), &mut errors);
        let status = validate_status(self.status.as_ref().map(Option::as_deref), &mut errors);

        match title {
            Some(title) if errors.is_empty() => Ok(NewTask {
                title,
                description: normalize_description(self.description),
                status: status.unwrap_or_default(),
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTaskRequest {
    #[serde(default, deserialize_with = "double_option")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub status: Option<Option<String>>,
}

impl UpdateTaskRequest {
    pub fn validate(self) -> Result<TaskPatch, Vec<FieldError>> {
        let mut errors = Vec::new();
        // A present title, null included, must be a non-blank string.
        let title = match &self.title {
            Some(title) => validate_title(title.as_deref(), &mut errors),
            None => None,
        };
        let status = validate_status(self.status.as_ref().map(Option::as_deref), &mut errors);

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(TaskPatch {
            title,
            description: self.description.map(normalize_description),
            status,
        })
    }
}

// ============================================================================
// Enhancement Requests
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhanceRequest {
    pub user_input: Option<String>,
}

impl EnhanceRequest {
    /// Returns the input text, rejecting empty or whitespace-only input.
    pub fn validate(self) -> Result<String, Vec<FieldError>> {
        match self.user_input {
            Some(input) if !input.trim().is_empty() => Ok(input),
            _ => Err(vec![FieldError::new("userInput", "Input is required")]),
        }
    }
}
