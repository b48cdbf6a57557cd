//! Registration and login.

use api_protocol::Registration;
use auth::{hash_password, verify_password, AuthError, JwtManager};
use entities::User;
use task_store::{TaskStore, TaskStoreError};

use crate::error::{ServerError, ServerResult};

/// Argon2 is CPU bound; keep it off the async workers.
async fn blocking<T, F>(f: F) -> ServerResult<T>
where
    F: FnOnce() -> Result<T, AuthError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ServerError::Internal(format!("password task failed: {}", e)))?
        .map_err(ServerError::from)
}

/// Creates an account and returns it with a fresh access token.
pub async fn register<S: TaskStore + ?Sized>(
    store: &S,
    jwt: &JwtManager,
    registration: Registration,
) -> ServerResult<(String, User)> {
    if store.get_user_by_email(&registration.email).await?.is_some() {
        return Err(ServerError::Conflict("Email is already registered".to_string()));
    }

    let password = registration.password;
    let password_hash = blocking(move || hash_password(&password)).await?;

    let user = store
        .create_user(User::new(registration.email, registration.name, password_hash))
        .await
        .map_err(|e| match e {
            TaskStoreError::AlreadyExists { .. } => {
                ServerError::Conflict("Email is already registered".to_string())
            }
            other => other.into(),
        })?;

    let token = jwt.generate_token(user.id, user.email.clone())?;
    tracing::info!(user_id = %user.id, "User registered");
    Ok((token, user))
}

/// Checks credentials and returns the user with a fresh access token.
pub async fn login<S: TaskStore + ?Sized>(
    store: &S,
    jwt: &JwtManager,
    email: &str,
    password: String,
) -> ServerResult<(String, User)> {
    let user = store
        .get_user_by_email(email)
        .await?
        .ok_or(ServerError::Auth(AuthError::InvalidCredentials))?;

    let password_hash = user.password_hash.clone();
    blocking(move || verify_password(&password, &password_hash)).await?;

    let token = jwt.generate_token(user.id, user.email.clone())?;
    tracing::info!(user_id = %user.id, "User logged in");
    Ok((token, user))
}
