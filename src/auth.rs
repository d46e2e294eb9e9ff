//! Password hashing, signed login tokens, and caller resolution.
//!
//! Two credentials circulate after login: a server-side session id and a
//! self-contained signed token. Requests may present either; the session
//! cookie wins, then the token cookie, then a bearer header.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::http::{header, HeaderMap};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{Duration, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::app_state::AppState;
use crate::domain::{DomainError, DomainResult, User};

pub const SESSION_COOKIE: &str = "sessionId";
pub const TOKEN_COOKIE: &str = "token";

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("valid username pattern"));
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

// ============================================================================
// Passwords
// ============================================================================

/// Hash a plaintext password into PHC string format.
pub fn hash_password(password: &str) -> DomainResult<String> {
    // ---
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| DomainError::Internal(anyhow::anyhow!("failed to hash password: {e}")))?;
    Ok(hash.to_string())
}

/// Check a plaintext password against a stored hash.
///
/// An unparseable stored hash counts as a mismatch rather than an error,
/// so a damaged record cannot be logged into.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    // ---
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        tracing::warn!("Stored password hash is not parseable");
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

// ============================================================================
// Signed tokens
// ============================================================================

#[derive(Serialize, Deserialize)]
struct TokenClaims {
    username: String,
    /// Unix timestamp, seconds.
    expires_at: i64,
}

fn sign(secret: &[u8], payload: &[u8]) -> String {
    // ---
    let mut hasher = Sha256::new();
    hasher.update(secret);
    hasher.update(b".");
    hasher.update(payload);
    hasher.update(b".");
    hasher.update(secret);
    hex::encode(hasher.finalize())
}

/// Mint a token of the form `base64url(claims) "." hex(signature)`.
pub fn issue_token(username: &str, secret: &str, ttl: Duration) -> DomainResult<String> {
    // ---
    let claims = TokenClaims {
        username: username.to_string(),
        expires_at: (Utc::now() + ttl).timestamp(),
    };
    let payload = serde_json::to_vec(&claims)?;
    let signature = sign(secret.as_bytes(), &payload);
    Ok(format!("{}.{signature}", URL_SAFE_NO_PAD.encode(&payload)))
}

/// Validate a token and return its username, or `None` for anything
/// malformed, mis-signed, or expired.
pub fn verify_token(token: &str, secret: &str) -> Option<String> {
    // ---
    let (body, signature) = token.split_once('.')?;
    let payload = URL_SAFE_NO_PAD.decode(body).ok()?;
    if sign(secret.as_bytes(), &payload) != signature {
        return None;
    }
    let claims: TokenClaims = serde_json::from_slice(&payload).ok()?;
    (claims.expires_at > Utc::now().timestamp()).then_some(claims.username)
}

// ============================================================================
// Cookies and headers
// ============================================================================

/// Pull a cookie's value out of the request headers.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    // ---
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

/// Pull a bearer token out of the Authorization header.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    // ---
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|t| t.trim().to_string())
}

/// Serialize a Set-Cookie value in the shape both login cookies use.
pub fn build_cookie(name: &str, value: &str, max_age_secs: i64) -> String {
    // ---
    format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}")
}

/// A Set-Cookie value that expires the named cookie immediately.
pub fn clear_cookie(name: &str) -> String {
    // ---
    build_cookie(name, "", 0)
}

/// Device description stored on new sessions, from the User-Agent header.
pub fn device_info(headers: &HeaderMap) -> String {
    // ---
    headers
        .get(header::USER_AGENT)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("Unknown device")
        .to_string()
}

// ============================================================================
// Caller resolution
// ============================================================================

/// Resolve the calling user, if any credential on the request checks out.
///
/// Order: session cookie, then token cookie, then bearer header. A dead
/// credential falls through to the next; backend failures propagate.
pub async fn current_user(state: &AppState, headers: &HeaderMap) -> DomainResult<Option<User>> {
    // ---
    let db = state.db();

    if let Some(session_id) = cookie_value(headers, SESSION_COOKIE) {
        if let Some(session) = db.sessions().get(&session_id).await? {
            return db.users().get(&session.username).await;
        }
    }

    let token = cookie_value(headers, TOKEN_COOKIE).or_else(|| bearer_token(headers));
    if let Some(token) = token {
        if let Some(username) = verify_token(&token, &state.auth().token_secret) {
            return db.users().get(&username).await;
        }
    }

    Ok(None)
}

/// Resolve the calling user or fail with `AuthenticationRequired`.
pub async fn require_user(state: &AppState, headers: &HeaderMap) -> DomainResult<User> {
    // ---
    current_user(state, headers)
        .await?
        .ok_or(DomainError::AuthenticationRequired)
}

// ============================================================================
// Request field validation
// ============================================================================

pub fn validate_username(username: &str) -> DomainResult<()> {
    // ---
    if username.is_empty() {
        return Err(DomainError::Validation("Username is required".into()));
    }
    if username.len() < 3 {
        return Err(DomainError::Validation(
            "Username must be at least 3 characters".into(),
        ));
    }
    if username.len() > 20 {
        return Err(DomainError::Validation(
            "Username must be less than 20 characters".into(),
        ));
    }
    if !USERNAME_RE.is_match(username) {
        return Err(DomainError::Validation(
            "Username can only contain letters, numbers, and underscores".into(),
        ));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> DomainResult<()> {
    // ---
    if password.is_empty() {
        return Err(DomainError::Validation("Password is required".into()));
    }
    if password.len() < 6 {
        return Err(DomainError::Validation(
            "Password must be at least 6 characters".into(),
        ));
    }
    if password.len() > 50 {
        return Err(DomainError::Validation(
            "Password must be less than 50 characters".into(),
        ));
    }
    Ok(())
}

/// Email is optional everywhere; this only rejects present-but-bogus values.
pub fn validate_email(email: &str) -> DomainResult<()> {
    // ---
    if !EMAIL_RE.is_match(email) {
        return Err(DomainError::Validation(
            "Please enter a valid email address".into(),
        ));
    }
    Ok(())
}
