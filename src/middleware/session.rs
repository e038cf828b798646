use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth::is_valid_session_token;
use crate::util::token_prefix;

const SESSION_TOKEN_HEADER: &str = "x-session-token";

/// Extract and shape-check the X-Session-Token header. Handlers resolve
/// the token to a user through the repository; this layer only rejects
/// requests that cannot possibly carry a valid session.
pub async fn require_session_token(mut req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().path().to_string();

    let token = req
        .headers()
        .get(SESSION_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    match token {
        Some(t) if is_valid_session_token(&t) => {
            tracing::debug!(
                token = %token_prefix(&t),
                method = %method,
                uri = %uri,
                "Session middleware: token shape valid, forwarding to handler"
            );
            req.extensions_mut().insert(SessionToken(t));
            next.run(req).await
        }
        Some(_) => {
            tracing::warn!(
                method = %method,
                uri = %uri,
                "Session middleware: rejected malformed session token"
            );
            (StatusCode::BAD_REQUEST, "Invalid session token format").into_response()
        }
        None => {
            tracing::warn!(
                method = %method,
                uri = %uri,
                "Session middleware: rejected request without X-Session-Token header"
            );
            (StatusCode::UNAUTHORIZED, "Missing X-Session-Token header").into_response()
        }
    }
}

/// Extractor for the shape-validated session token.
#[derive(Debug, Clone)]
pub struct SessionToken(pub String);
