use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::{self, TraceLayer};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use returnos_store::advisory::AdvisoryClient;
use returnos_store::config::Config;
use returnos_store::draft_saver::DraftSaver;
use returnos_store::middleware::rate_limit::RateLimiter;
use returnos_store::repository::ReturnRepository;
use returnos_store::sqlite_repo::SqliteRepository;
use returnos_store::util::now_millis;
use returnos_store::{build_app, db, AppState};

fn build_cors(config: &Config) -> CorsLayer {
    let origins: Vec<_> = config
        .cors_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(AllowMethods::any())
        .allow_headers(AllowHeaders::any())
}

/// Background job: purge expired sessions and sweep in-memory state.
async fn maintenance_job(
    repo: Arc<dyn ReturnRepository>,
    rate_limiter: RateLimiter,
    draft_saver: DraftSaver,
    session_ttl_days: i64,
) {
    let mut interval = tokio::time::interval(Duration::from_secs(60 * 60));

    loop {
        interval.tick().await;

        let cutoff = now_millis() - (session_ttl_days * 24 * 60 * 60 * 1000);

        match repo.purge_expired_sessions(cutoff).await {
            Ok(count) => {
                if count > 0 {
                    tracing::info!("Purged {} expired sessions", count);
                }
            }
            Err(e) => tracing::error!("Maintenance job error: {e}"),
        }

        rate_limiter.evict_stale().await;
        draft_saver.sweep_finished().await;
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();

    let pool = db::init_pool(&config.database_url)
        .await
        .expect("Failed to initialize database");

    tracing::info!("Database initialized at {}", config.database_url);

    let cors = build_cors(&config);

    let repo: Arc<dyn ReturnRepository> = Arc::new(SqliteRepository::new(pool.clone()));
    let draft_saver = DraftSaver::new(repo.clone(), config.draft_debounce_ms);
    let rate_limiter = RateLimiter::new(10, 30);
    let state = AppState {
        repo: repo.clone(),
        advisory: AdvisoryClient::new(
            config.advisory_api_key.clone(),
            config.advisory_api_url.clone(),
        ),
        draft_saver: draft_saver.clone(),
        rate_limiter: rate_limiter.clone(),
        max_items_per_account: config.max_items_per_account,
        max_payload_bytes: config.max_payload_bytes,
        max_draft_bytes: config.max_draft_bytes,
    };

    let app = build_app(state)
        .layer(RequestBodyLimitLayer::new(config.max_payload_bytes))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_request(trace::DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    trace::DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(tower_http::LatencyUnit::Millis),
                ),
        )
        .layer(cors);

    // Spawn maintenance background job
    tokio::spawn(maintenance_job(
        repo,
        rate_limiter,
        draft_saver,
        config.session_ttl_days,
    ));

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutting down...");
}
