use pbkdf2::pbkdf2_hmac;
use rand::Rng;
use sha2::Sha256;

const PBKDF2_ROUNDS: u32 = 100_000;
const SALT_LEN: usize = 16;

/// Derive a salted PBKDF2-SHA256 hash of a password, hex-encoded.
/// Credentials are never stored or compared in plain text.
pub fn hash_password(password: &str, salt: &[u8]) -> String {
    let mut derived = [0u8; 32];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ROUNDS, &mut derived);
    hex::encode(derived)
}

pub fn verify_password(password: &str, salt: &[u8], expected_hash: &str) -> bool {
    hash_password(password, salt) == expected_hash
}

pub fn generate_salt() -> Vec<u8> {
    let salt: [u8; SALT_LEN] = rand::thread_rng().gen();
    salt.to_vec()
}

/// Issue an opaque session token: 32 random bytes, hex-encoded (64 chars).
pub fn generate_session_token() -> String {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    hex::encode(bytes)
}

/// Validate the shape of a session token before it reaches a handler:
/// exactly 64 hex chars.
pub fn is_valid_session_token(token: &str) -> bool {
    token.len() == 64 && token.chars().all(|c| c.is_ascii_hexdigit())
}
