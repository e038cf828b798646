use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};

use crate::error::AppError;
use crate::middleware::session::SessionToken;
use crate::models::draft::{Draft, DraftSaveResponse};
use crate::util::email_prefix;
use crate::AppState;

/// GET /api/v1/draft: the user's draft slot, or null.
pub async fn get(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
) -> Result<impl IntoResponse, AppError> {
    let user = super::require_user(&state, &token).await?;

    tracing::info!(
        handler = "get_draft",
        user = %email_prefix(&user.email),
        "Handler: GET /api/v1/draft"
    );

    let draft = state.repo.get_draft(&user.email).await?;

    Ok(Json(draft))
}

/// PUT /api/v1/draft: schedule a debounced save of the single draft
/// slot. Oversized drafts are skipped rather than failed: the response
/// reports `saved: false` and the previous draft stays intact.
pub async fn save(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Json(draft): Json<Draft>,
) -> Result<impl IntoResponse, AppError> {
    let user = super::require_user(&state, &token).await?;

    tracing::info!(
        handler = "save_draft",
        user = %email_prefix(&user.email),
        draft_bytes = draft.byte_len(),
        "Handler: PUT /api/v1/draft"
    );

    if draft.byte_len() > state.max_draft_bytes {
        tracing::warn!(
            handler = "save_draft",
            user = %email_prefix(&user.email),
            draft_bytes = draft.byte_len(),
            limit = state.max_draft_bytes,
            "Draft storage limit exceeded, write skipped"
        );
        return Ok(Json(DraftSaveResponse { saved: false }));
    }

    state.draft_saver.schedule(&user.email, draft).await;

    Ok(Json(DraftSaveResponse { saved: true }))
}

/// DELETE /api/v1/draft: clear the slot and cancel any pending
/// debounced write so the cleared draft cannot reappear.
pub async fn clear(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
) -> Result<impl IntoResponse, AppError> {
    let user = super::require_user(&state, &token).await?;

    tracing::info!(
        handler = "clear_draft",
        user = %email_prefix(&user.email),
        "Handler: DELETE /api/v1/draft"
    );

    state.draft_saver.cancel(&user.email).await;
    state.repo.clear_draft(&user.email).await?;

    Ok(StatusCode::NO_CONTENT)
}
