use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    DuplicateAccount(String),
    InvalidCredentials(String),
    Unauthorized(String),
    BadRequest(String),
    TooManyRequests(String),
    StorageExhausted(String),
    Database(sqlx::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::DuplicateAccount(msg) => write!(f, "duplicate account: {msg}"),
            AppError::InvalidCredentials(msg) => write!(f, "invalid credentials: {msg}"),
            AppError::Unauthorized(msg) => write!(f, "unauthorized: {msg}"),
            AppError::BadRequest(msg) => write!(f, "bad request: {msg}"),
            AppError::TooManyRequests(msg) => write!(f, "too many requests: {msg}"),
            AppError::StorageExhausted(msg) => write!(f, "storage exhausted: {msg}"),
            AppError::Database(e) => write!(f, "database error: {e}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::DuplicateAccount(msg) => {
                tracing::warn!(error_type = "duplicate_account", message = %msg, "Responding with 409");
                (StatusCode::CONFLICT, msg)
            }
            AppError::InvalidCredentials(msg) => {
                tracing::warn!(error_type = "invalid_credentials", message = %msg, "Responding with 401");
                (StatusCode::UNAUTHORIZED, msg)
            }
            AppError::Unauthorized(msg) => {
                tracing::warn!(error_type = "unauthorized", message = %msg, "Responding with 401");
                (StatusCode::UNAUTHORIZED, msg)
            }
            AppError::BadRequest(msg) => {
                tracing::warn!(error_type = "bad_request", message = %msg, "Responding with 400");
                (StatusCode::BAD_REQUEST, msg)
            }
            AppError::TooManyRequests(msg) => {
                tracing::warn!(error_type = "too_many_requests", message = %msg, "Responding with 429");
                (StatusCode::TOO_MANY_REQUESTS, msg)
            }
            AppError::StorageExhausted(msg) => {
                tracing::warn!(error_type = "storage_exhausted", message = %msg, "Responding with 507");
                (StatusCode::INSUFFICIENT_STORAGE, msg)
            }
            AppError::Database(e) => {
                tracing::error!(error_type = "database", error = %e, "Responding with 500");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Database(e)
    }
}
