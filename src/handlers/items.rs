use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};

use crate::error::AppError;
use crate::middleware::session::SessionToken;
use crate::models::item::ReturnItem;
use crate::util::email_prefix;
use crate::AppState;

/// GET /api/v1/items: active set in storage order. Callers re-sort;
/// ordering is only guaranteed after restore/restore-all/import.
pub async fn list(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
) -> Result<impl IntoResponse, AppError> {
    let user = super::require_user(&state, &token).await?;

    tracing::info!(
        handler = "list_items",
        user = %email_prefix(&user.email),
        "Handler: GET /api/v1/items"
    );

    let items = state.repo.get_items(&user.email).await?;

    tracing::info!(
        handler = "list_items",
        user = %email_prefix(&user.email),
        returned = items.len(),
        status = 200,
        "Responding: active items"
    );

    Ok(Json(items))
}

/// POST /api/v1/items: prepend a new record to the active set. This
/// layer performs no duplicate-id check; ids are time-derived by the
/// caller. Exceeding the per-account cap skips the write (507).
pub async fn create(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Json(item): Json<ReturnItem>,
) -> Result<impl IntoResponse, AppError> {
    let user = super::require_user(&state, &token).await?;

    tracing::info!(
        handler = "create_item",
        user = %email_prefix(&user.email),
        item_id = %item.id,
        "Handler: POST /api/v1/items"
    );

    if let Err(msg) = item.validate() {
        return Err(AppError::BadRequest(format!("Invalid item '{}': {msg}", item.id)));
    }

    tracing::debug!(handler = "create_item", "Dispatching to repo.count_items");
    let count = state.repo.count_items(&user.email).await?;
    if count >= state.max_items_per_account {
        tracing::warn!(handler = "create_item", count, "Item limit reached, write skipped");
        return Err(AppError::StorageExhausted("Item limit reached".into()));
    }

    tracing::debug!(handler = "create_item", "Dispatching to repo.save_item");
    state.repo.save_item(&user.email, &item).await?;

    tracing::info!(
        handler = "create_item",
        user = %email_prefix(&user.email),
        item_id = %item.id,
        status = 201,
        "Responding: item saved"
    );

    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /api/v1/items/{id}: replace the active item with that id.
/// A missing id degrades to a silent no-op (stale UI state is expected).
pub async fn update(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Path(id): Path<String>,
    Json(item): Json<ReturnItem>,
) -> Result<impl IntoResponse, AppError> {
    let user = super::require_user(&state, &token).await?;

    tracing::info!(
        handler = "update_item",
        user = %email_prefix(&user.email),
        item_id = %id,
        "Handler: PUT /api/v1/items/{{id}}"
    );

    if item.id != id {
        return Err(AppError::BadRequest("Item id does not match path".into()));
    }
    if let Err(msg) = item.validate() {
        return Err(AppError::BadRequest(format!("Invalid item '{id}': {msg}")));
    }

    let updated = state.repo.update_item(&user.email, &item).await?;
    tracing::debug!(handler = "update_item", updated, "Repo returned");

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/items/{id}: maintenance hard delete from the active
/// set, bypassing trash. Not part of the primary UI flow.
pub async fn delete(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user = super::require_user(&state, &token).await?;

    tracing::info!(
        handler = "delete_item",
        user = %email_prefix(&user.email),
        item_id = %id,
        "Handler: DELETE /api/v1/items/{{id}}"
    );

    state.repo.delete_item(&user.email, &id).await?;

    Ok(StatusCode::NO_CONTENT)
}
