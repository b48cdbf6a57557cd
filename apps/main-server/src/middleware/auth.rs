//! Authentication middleware.

use std::sync::Arc;

use ::auth::{Claims, JwtManager};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use task_store::TaskStore;
use uuid::Uuid;

use crate::error::ServerError;
use crate::state::AppState;

/// Authenticated user information.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// User ID.
    pub id: Uuid,
    /// User email.
    pub email: String,
}

impl TryFrom<Claims> for AuthenticatedUser {
    type Error = ::auth::AuthError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        Ok(Self {
            id: claims.user_id()?,
            email: claims.email,
        })
    }
}

/// Extracts the bearer token from the Authorization header.
fn extract_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn authenticate(jwt_manager: &JwtManager, token: &str) -> Result<AuthenticatedUser, ServerError> {
    let claims = jwt_manager.validate_token(token).map_err(|e| {
        tracing::debug!(error = %e, "Rejected bearer token");
        ServerError::Unauthenticated
    })?;
    AuthenticatedUser::try_from(claims).map_err(|_| ServerError::Unauthenticated)
}

/// Authentication middleware.
///
/// Validates a bearer token when one is present and stores the user in the
/// request extensions. Requests without a valid token pass through with no
/// identity, so public routes stay reachable with a stale header; handlers
/// that need an owner use [`CurrentUser`], which answers 401.
pub async fn auth_middleware<S: TaskStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = extract_token(&request).map(str::to_owned) {
        if let Ok(user) = authenticate(&state.jwt_manager, &token) {
            request.extensions_mut().insert(user);
        }
    }

    next.run(request).await
}

/// Extractor for the authenticated caller.
///
/// Fails with `401 UNAUTHENTICATED` when the middleware stored no identity.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub AuthenticatedUser);

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or(ServerError::Unauthenticated)
    }
}
