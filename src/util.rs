use std::time::{SystemTime, UNIX_EPOCH};

/// Shorten an email for log lines without dropping the partition identity
/// entirely (local part only, domain elided).
pub fn email_prefix(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}

pub fn token_prefix(t: &str) -> &str {
    &t[..t.len().min(12)]
}

pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
