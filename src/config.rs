use std::env;

pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub cors_origins: Vec<String>,
    pub max_items_per_account: i64,
    pub max_payload_bytes: usize,
    pub max_draft_bytes: usize,
    pub draft_debounce_ms: u64,
    pub session_ttl_days: i64,
    pub advisory_api_key: Option<String>,
    pub advisory_api_url: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:returnos-store.db".to_string()),
            cors_origins: env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:5173".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            max_items_per_account: env::var("MAX_ITEMS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10_000),
            // Item payloads carry data-URL images, so the body limit is generous.
            max_payload_bytes: env::var("MAX_PAYLOAD_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10_485_760), // 10 MB
            max_draft_bytes: env::var("MAX_DRAFT_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5_242_880), // 5 MB
            draft_debounce_ms: env::var("DRAFT_DEBOUNCE_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(800),
            session_ttl_days: env::var("SESSION_TTL_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            advisory_api_key: env::var("ADVISORY_API_KEY").ok().filter(|k| !k.is_empty()),
            advisory_api_url: env::var("ADVISORY_API_URL")
                .unwrap_or_else(|_| "https://openrouter.ai/api/v1/chat/completions".to_string()),
        }
    }
}
