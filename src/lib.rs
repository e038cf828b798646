pub mod advisory;
pub mod auth;
pub mod config;
pub mod db;
pub mod draft_saver;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod sqlite_repo;
pub mod util;

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use advisory::AdvisoryClient;
use draft_saver::DraftSaver;
use middleware::rate_limit::RateLimiter;
use repository::ReturnRepository;

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn ReturnRepository>,
    pub advisory: AdvisoryClient,
    pub draft_saver: DraftSaver,
    pub rate_limiter: RateLimiter,
    pub max_items_per_account: i64,
    pub max_payload_bytes: usize,
    pub max_draft_bytes: usize,
}

fn authenticated_routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/auth/logout", post(handlers::accounts::logout))
        .route("/api/v1/auth/session", get(handlers::accounts::session))
        .route(
            "/api/v1/items",
            get(handlers::items::list).post(handlers::items::create),
        )
        .route(
            "/api/v1/items/{id}",
            put(handlers::items::update).delete(handlers::items::delete),
        )
        .route("/api/v1/items/{id}/trash", post(handlers::trash::soft_delete))
        .route(
            "/api/v1/trash",
            get(handlers::trash::list).delete(handlers::trash::empty),
        )
        .route("/api/v1/trash/restore-all", post(handlers::trash::restore_all))
        .route(
            "/api/v1/trash/{id}",
            delete(handlers::trash::permanent_delete),
        )
        .route("/api/v1/trash/{id}/restore", post(handlers::trash::restore))
        .route("/api/v1/backup/export", get(handlers::portability::export))
        .route("/api/v1/backup/import", post(handlers::portability::import))
        .route(
            "/api/v1/draft",
            get(handlers::drafts::get)
                .put(handlers::drafts::save)
                .delete(handlers::drafts::clear),
        )
        .route("/api/v1/advisory/analyze", post(handlers::advisory::analyze))
        .layer(axum_middleware::from_fn(
            middleware::session::require_session_token,
        ))
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/auth/register", post(handlers::accounts::register))
        .route("/api/v1/auth/login", post(handlers::accounts::login))
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health_check))
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/metrics", get(handlers::admin::get_metrics))
        .layer(axum_middleware::from_fn(
            middleware::admin_auth::require_admin_token,
        ))
}

/// Build the full application router (used by main and tests). Item and
/// draft payloads carry data-URL images, so the default body limit is
/// lifted to the configured payload cap.
pub fn build_app(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.max_payload_bytes);
    Router::new()
        .merge(authenticated_routes())
        .merge(public_routes())
        .merge(health_routes())
        .merge(admin_routes())
        .layer(body_limit)
        .with_state(state)
}
