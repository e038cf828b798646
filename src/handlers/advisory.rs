use axum::{extract::State, response::IntoResponse, Extension, Json};
use serde::Deserialize;

use crate::error::AppError;
use crate::middleware::session::SessionToken;
use crate::util::email_prefix;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AnalyzeRequest {
    pub image_base64: String,
    pub mime_type: String,
}

/// POST /api/v1/advisory/analyze: best-effort title/description
/// suggestion for an uploaded image. Always answers 200 with either a
/// real suggestion or the sentinel pair; the data path never depends on
/// this call succeeding.
pub async fn analyze(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Json(body): Json<AnalyzeRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = super::require_user(&state, &token).await?;

    tracing::info!(
        handler = "analyze",
        user = %email_prefix(&user.email),
        mime_type = %body.mime_type,
        image_bytes = body.image_base64.len(),
        "Handler: POST /api/v1/advisory/analyze"
    );

    let advisory = state.advisory.analyze(&body.image_base64, &body.mime_type).await;

    tracing::info!(
        handler = "analyze",
        user = %email_prefix(&user.email),
        title = %advisory.title,
        status = 200,
        "Responding: advisory result"
    );

    Ok(Json(advisory))
}
