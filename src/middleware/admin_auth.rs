use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Gate for the /admin routes: `Authorization: Bearer <token>` must match
/// the `ADMIN_TOKEN` environment variable. When no admin token is
/// configured the routes answer 404, so the surface is invisible on
/// deployments that never opted in.
pub async fn require_admin_token(req: Request, next: Next) -> Response {
    let expected = std::env::var("ADMIN_TOKEN").ok().filter(|t| !t.is_empty());

    let Some(expected) = expected else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let provided = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    if provided == Some(expected.as_str()) {
        next.run(req).await
    } else {
        tracing::warn!(uri = %req.uri().path(), "Admin middleware: rejected");
        StatusCode::UNAUTHORIZED.into_response()
    }
}
