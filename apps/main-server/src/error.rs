//! Server error types.

use api_protocol::{error_codes, ApiError, ErrorBody, FieldError};
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use task_store::TaskStoreError;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// No valid identity on the request.
    #[error("Authentication required")]
    Unauthenticated,

    /// Authenticated, but the resource belongs to someone else.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Request fields failed validation.
    #[error("Invalid input")]
    Validation(Vec<FieldError>),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The request conflicts with current state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Storage error.
    #[error("Database error: {0}")]
    Database(#[from] TaskStoreError),

    /// Authentication error.
    #[error("Auth error: {0}")]
    Auth(#[from] auth::AuthError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }

    fn internal(&self) -> (StatusCode, ApiError) {
        tracing::error!(error = %self, "Request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::new(error_codes::INTERNAL_ERROR, "Internal server error"),
        )
    }

    fn status_and_body(&self) -> (StatusCode, ApiError) {
        match self {
            ServerError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                ApiError::new(error_codes::UNAUTHENTICATED, "Authentication required"),
            ),
            ServerError::Forbidden(msg) => (
                StatusCode::FORBIDDEN,
                ApiError::new(error_codes::FORBIDDEN, msg.clone()),
            ),
            ServerError::Validation(details) => {
                (StatusCode::BAD_REQUEST, ApiError::validation(details.clone()))
            }
            ServerError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ApiError::new(error_codes::NOT_FOUND, msg.clone()),
            ),
            ServerError::Conflict(msg) => (
                StatusCode::CONFLICT,
                ApiError::new(error_codes::CONFLICT, msg.clone()),
            ),
            ServerError::Database(e) => match e {
                TaskStoreError::NotFound { entity_type, .. } => (
                    StatusCode::NOT_FOUND,
                    ApiError::new(error_codes::NOT_FOUND, format!("{} not found", entity_type)),
                ),
                TaskStoreError::AlreadyExists { entity_type, .. } => (
                    StatusCode::CONFLICT,
                    ApiError::new(error_codes::CONFLICT, format!("{} already exists", entity_type)),
                ),
                TaskStoreError::ActiveTimeLogExists { .. } => (
                    StatusCode::CONFLICT,
                    ApiError::new(error_codes::CONFLICT, "Timer is already running for this task"),
                ),
                _ => self.internal(),
            },
            ServerError::Auth(e) if e.is_client_error() => (
                StatusCode::UNAUTHORIZED,
                ApiError::new(error_codes::UNAUTHENTICATED, e.to_string()),
            ),
            ServerError::Auth(_) | ServerError::Internal(_) => self.internal(),
        }
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        ServerError::validation("body", rejection.body_text())
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, error) = self.status_and_body();
        (status, Json(ErrorBody::from(error))).into_response()
    }
}

/// Result type alias for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
