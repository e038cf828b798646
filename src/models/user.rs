use serde::{Deserialize, Serialize};

/// User as exposed to callers. The credential never leaves the store.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SafeUser {
    pub full_name: String,
    pub email: String,
}

/// Internal account row, including the salted credential hash.
pub struct UserRecord {
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
    pub salt: Vec<u8>,
}

impl UserRecord {
    pub fn to_safe(&self) -> SafeUser {
        SafeUser {
            full_name: self.full_name.clone(),
            email: self.email.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Returned by register and login: the safe user plus a session token
/// the client sends back in the `x-session-token` header.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: SafeUser,
    pub session_token: String,
}
