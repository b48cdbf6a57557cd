//! Task text enhancement endpoint.

use std::sync::Arc;

use api_protocol::{EnhanceRequest, EnhanceResponse};
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use task_store::TaskStore;

use crate::error::{ServerError, ServerResult};
use crate::middleware::CurrentUser;
use crate::state::AppState;

/// Turns free text into a task title and description.
///
/// Always answers with a draft once the input is valid; upstream failures
/// degrade to the offline capitalization.
pub async fn enhance_task<S: TaskStore>(
    State(state): State<Arc<AppState<S>>>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<EnhanceRequest>, JsonRejection>,
) -> ServerResult<Json<EnhanceResponse>> {
    let Json(request) = payload?;
    let user_input = request.validate().map_err(ServerError::Validation)?;

    let enhancement = state.enhancer.enhance(&user_input).await;
    tracing::debug!(user_id = %user.id, fallback = enhancement.is_fallback(), "Task input enhanced");

    let draft = enhancement.into_draft();
    Ok(Json(EnhanceResponse {
        title: draft.title,
        description: draft.description,
    }))
}
