use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};

use crate::error::AppError;
use crate::middleware::session::SessionToken;
use crate::util::email_prefix;
use crate::AppState;

/// GET /api/v1/trash: trashed items.
pub async fn list(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
) -> Result<impl IntoResponse, AppError> {
    let user = super::require_user(&state, &token).await?;

    tracing::info!(
        handler = "list_trash",
        user = %email_prefix(&user.email),
        "Handler: GET /api/v1/trash"
    );

    let items = state.repo.get_trash(&user.email).await?;

    tracing::info!(
        handler = "list_trash",
        user = %email_prefix(&user.email),
        returned = items.len(),
        status = 200,
        "Responding: trashed items"
    );

    Ok(Json(items))
}

/// POST /api/v1/items/{id}/trash: soft delete, moving active -> trash
/// with every field preserved. Missing ids are silent no-ops.
pub async fn soft_delete(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user = super::require_user(&state, &token).await?;

    tracing::info!(
        handler = "soft_delete",
        user = %email_prefix(&user.email),
        item_id = %id,
        "Handler: POST /api/v1/items/{{id}}/trash"
    );

    state.repo.soft_delete(&user.email, &id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/trash/{id}/restore: move trash -> active, then the
/// active set is resorted descending by timestamp.
pub async fn restore(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user = super::require_user(&state, &token).await?;

    tracing::info!(
        handler = "restore",
        user = %email_prefix(&user.email),
        item_id = %id,
        "Handler: POST /api/v1/trash/{{id}}/restore"
    );

    state.repo.restore(&user.email, &id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/trash/restore-all: move everything back to active and
/// resort; trash ends empty even when it started empty.
pub async fn restore_all(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
) -> Result<impl IntoResponse, AppError> {
    let user = super::require_user(&state, &token).await?;

    tracing::info!(
        handler = "restore_all",
        user = %email_prefix(&user.email),
        "Handler: POST /api/v1/trash/restore-all"
    );

    state.repo.restore_all(&user.email).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/trash/{id}: purge one item. Irreversible; the active
/// set is untouched.
pub async fn permanent_delete(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user = super::require_user(&state, &token).await?;

    tracing::info!(
        handler = "permanent_delete",
        user = %email_prefix(&user.email),
        item_id = %id,
        "Handler: DELETE /api/v1/trash/{{id}}"
    );

    state.repo.permanent_delete(&user.email, &id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/trash: empty the trash unconditionally.
pub async fn empty(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
) -> Result<impl IntoResponse, AppError> {
    let user = super::require_user(&state, &token).await?;

    tracing::info!(
        handler = "empty_trash",
        user = %email_prefix(&user.email),
        "Handler: DELETE /api/v1/trash"
    );

    state.repo.empty_trash(&user.email).await?;

    Ok(StatusCode::NO_CONTENT)
}
