pub mod accounts;
pub mod admin;
pub mod advisory;
pub mod drafts;
pub mod health;
pub mod items;
pub mod portability;
pub mod trash;

use crate::error::AppError;
use crate::models::user::SafeUser;
use crate::AppState;

/// Resolve a shape-validated session token to its user, or 401 when the
/// session is unknown (logged out, expired, or fabricated).
pub(crate) async fn require_user(state: &AppState, token: &str) -> Result<SafeUser, AppError> {
    state
        .repo
        .find_session(token)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Session not found".into()))
}
