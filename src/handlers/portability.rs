use axum::{body::Bytes, extract::State, response::IntoResponse, Extension, Json};
use chrono::{SecondsFormat, Utc};

use crate::error::AppError;
use crate::middleware::session::SessionToken;
use crate::models::bundle::{ExportBundle, ImportResponse, APP_VERSION, BUNDLE_SIGNATURE};
use crate::util::email_prefix;
use crate::AppState;

/// GET /api/v1/backup/export: self-describing snapshot of the user's
/// full item + trash state, suitable for download and re-import on
/// another device.
pub async fn export(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
) -> Result<impl IntoResponse, AppError> {
    let user = super::require_user(&state, &token).await?;

    tracing::info!(
        handler = "export",
        user = %email_prefix(&user.email),
        "Handler: GET /api/v1/backup/export"
    );

    let items = state.repo.get_items(&user.email).await?;
    let trash = state.repo.get_trash(&user.email).await?;

    tracing::info!(
        handler = "export",
        user = %email_prefix(&user.email),
        items = items.len(),
        trash = trash.len(),
        status = 200,
        "Responding: bundle exported"
    );

    Ok(Json(ExportBundle {
        email: user.email,
        export_date: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        items,
        trash,
        app_version: APP_VERSION.into(),
        signature: BUNDLE_SIGNATURE.into(),
    }))
}

/// POST /api/v1/backup/import: merge a bundle into the user's partition.
/// Failures are soft: unparseable bodies (including binary uploads that
/// are not text at all) and signature mismatches answer 200 with
/// `success: false` and leave stored data untouched.
pub async fn import(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let user = super::require_user(&state, &token).await?;

    tracing::info!(
        handler = "import",
        user = %email_prefix(&user.email),
        body_bytes = body.len(),
        "Handler: POST /api/v1/backup/import"
    );

    let bundle: ExportBundle = match serde_json::from_slice(&body) {
        Ok(bundle) => bundle,
        Err(e) => {
            tracing::warn!(handler = "import", error = %e, "Import rejected: parse failure");
            return Ok(Json(ImportResponse::parse_failure()));
        }
    };

    if bundle.signature != BUNDLE_SIGNATURE {
        tracing::warn!(handler = "import", "Import rejected: signature mismatch");
        return Ok(Json(ImportResponse::invalid_format()));
    }

    tracing::debug!(handler = "import", "Dispatching to repo.merge_import");
    let added = state
        .repo
        .merge_import(&user.email, &bundle.items, &bundle.trash)
        .await?;

    tracing::info!(
        handler = "import",
        user = %email_prefix(&user.email),
        added,
        status = 200,
        "Responding: bundle merged"
    );

    Ok(Json(ImportResponse::restored(added)))
}
