//! Authentication API endpoints.

use std::sync::Arc;

use api_protocol::{AuthResponse, LoginRequest, MeResponse, RegisterRequest};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use task_store::TaskStore;

use crate::error::{ServerError, ServerResult};
use crate::middleware::CurrentUser;
use crate::services::accounts;
use crate::state::AppState;

/// Registers a new account.
pub async fn register<S: TaskStore>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ServerResult<(StatusCode, Json<AuthResponse>)> {
    let Json(request) = payload?;
    let registration = request
        .validate(::auth::MIN_PASSWORD_LENGTH)
        .map_err(ServerError::Validation)?;

    let (token, user) = accounts::register(&state.store, &state.jwt_manager, registration).await?;
    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

/// Exchanges credentials for an access token.
pub async fn login<S: TaskStore>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ServerResult<Json<AuthResponse>> {
    let Json(request) = payload?;
    let (email, password) = request.validate().map_err(ServerError::Validation)?;

    let (token, user) = accounts::login(&state.store, &state.jwt_manager, &email, password).await?;
    Ok(Json(AuthResponse { token, user }))
}

/// Gets the current user.
pub async fn me<S: TaskStore>(
    State(state): State<Arc<AppState<S>>>,
    CurrentUser(user): CurrentUser,
) -> ServerResult<Json<MeResponse>> {
    // A valid token for a user that no longer exists is not an identity.
    let user = state
        .store
        .get_user(user.id)
        .await?
        .ok_or(ServerError::Unauthenticated)?;
    Ok(Json(MeResponse { user }))
}
