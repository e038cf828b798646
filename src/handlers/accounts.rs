use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};

use crate::auth;
use crate::error::AppError;
use crate::middleware::session::SessionToken;
use crate::models::user::{AuthResponse, LoginRequest, RegisterRequest};
use crate::repository::NewUser;
use crate::util::email_prefix;
use crate::AppState;

/// POST /api/v1/auth/register: create an account and open a session.
/// Duplicate emails are rejected with 409 (case-sensitive exact match).
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!(
        handler = "register",
        user = %email_prefix(&body.email),
        "Handler: POST /api/v1/auth/register"
    );

    if !state.rate_limiter.check(&body.email).await {
        return Err(AppError::TooManyRequests("Rate limit exceeded".into()));
    }

    if body.email.is_empty() || !body.email.contains('@') {
        tracing::warn!(handler = "register", "Validation failed: invalid email");
        return Err(AppError::BadRequest("Invalid email address".into()));
    }
    if body.password.is_empty() {
        return Err(AppError::BadRequest("Password must not be empty".into()));
    }
    if body.full_name.trim().is_empty() {
        return Err(AppError::BadRequest("Full name must not be empty".into()));
    }

    let salt = auth::generate_salt();
    let user = NewUser {
        email: body.email.clone(),
        full_name: body.full_name.clone(),
        password_hash: auth::hash_password(&body.password, &salt),
        salt,
    };

    tracing::debug!(handler = "register", "Dispatching to repo.create_user");
    state.repo.create_user(&user).await?;

    // Auto login after register
    let token = auth::generate_session_token();
    tracing::debug!(handler = "register", "Dispatching to repo.create_session");
    state.repo.create_session(&token, &body.email).await?;

    tracing::info!(
        handler = "register",
        user = %email_prefix(&body.email),
        status = 201,
        "Responding: account created, session opened"
    );

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: crate::models::user::SafeUser {
                full_name: body.full_name,
                email: body.email,
            },
            session_token: token,
        }),
    ))
}

/// POST /api/v1/auth/login: verify credentials and open a session.
/// Unknown email and wrong password produce the same 401.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!(
        handler = "login",
        user = %email_prefix(&body.email),
        "Handler: POST /api/v1/auth/login"
    );

    if !state.rate_limiter.check(&body.email).await {
        return Err(AppError::TooManyRequests("Rate limit exceeded".into()));
    }

    tracing::debug!(handler = "login", "Dispatching to repo.find_user");
    let user = state.repo.find_user(&body.email).await?;

    let Some(user) = user else {
        tracing::warn!(handler = "login", user = %email_prefix(&body.email), "Login failed: unknown email");
        return Err(AppError::InvalidCredentials("Invalid email or password".into()));
    };

    if !auth::verify_password(&body.password, &user.salt, &user.password_hash) {
        tracing::warn!(handler = "login", user = %email_prefix(&body.email), "Login failed: password mismatch");
        return Err(AppError::InvalidCredentials("Invalid email or password".into()));
    }

    let token = auth::generate_session_token();
    tracing::debug!(handler = "login", "Dispatching to repo.create_session");
    state.repo.create_session(&token, &user.email).await?;

    tracing::info!(
        handler = "login",
        user = %email_prefix(&user.email),
        status = 200,
        "Responding: session opened"
    );

    Ok(Json(AuthResponse {
        user: user.to_safe(),
        session_token: token,
    }))
}

/// POST /api/v1/auth/logout: drop the session unconditionally.
pub async fn logout(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!(handler = "logout", "Handler: POST /api/v1/auth/logout");

    state.repo.delete_session(&token).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/session: current user, no side effects.
pub async fn session(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
) -> Result<impl IntoResponse, AppError> {
    let user = super::require_user(&state, &token).await?;

    tracing::info!(
        handler = "session",
        user = %email_prefix(&user.email),
        status = 200,
        "Responding: session resolved"
    );

    Ok(Json(user))
}
