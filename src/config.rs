// src/config.rs

//! Environment-driven configuration, resolved once at startup.
//!
//! Everything the service can be tuned with lives here, split per
//! concern. A missing required variable aborts startup; nothing is
//! re-read after boot.

use anyhow::Result;

// ============================================================
// Local macros (config-only, intentionally explicit)
// ============================================================

/// Reads an environment variable that must be present.
///
/// Absence fails the enclosing `from_env` with a message naming the
/// variable, so a bad deployment dies at boot instead of limping on.
macro_rules! required_env {
    // ---
    ($key:literal) => {
        std::env::var($key)
            .map_err(|_| anyhow::anyhow!(concat!("Missing required configuration: ", $key)))?
    };
}

/// Reads and parses an environment variable, falling back to a default
/// when it is absent or unparseable. For tuning knobs only; anything
/// security-relevant goes through `required_env!`.
macro_rules! optional_env_parse {
    // ---
    ($key:literal, $ty:ty, $default:expr) => {
        std::env::var($key)
            .ok()
            .and_then(|v| v.parse::<$ty>().ok())
            .unwrap_or($default)
    };
}

#[cfg(test)]
/// Asserts that a config constructor failed because the named variable
/// was missing. Keeps the tests honest about the exact error text.
macro_rules! assert_missing_config {
    // ---
    ($expr:expr, $key:literal) => {{
        let err = $expr.expect_err("expected configuration error");
        assert!(
            err.to_string()
                .contains(concat!("Missing required configuration: ", $key)),
            "unexpected error: {err}"
        );
    }};
}

// ============================================================
// Public configuration facade
// ============================================================

/// Everything the process was configured with, in one place.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store: store::StoreConfig,
    pub auth: auth::AuthConfig,
    pub server: server::ServerConfig,
}

impl AppConfig {
    /// Resolves the whole configuration, meant to run once at startup.
    ///
    /// # Errors
    /// Fails when any required variable is missing.
    pub fn from_env() -> Result<Self> {
        // ---
        Ok(Self {
            store: store::StoreConfig::from_env()?,
            auth: auth::AuthConfig::from_env()?,
            server: server::ServerConfig::from_env()?,
        })
    }
}

// ============================================================
// Store configuration
// ============================================================

mod store {
    // ---
    use super::*;

    /// Key-value backend configuration.
    ///
    /// All persistent state (users, rooms, progress, sessions) lives in
    /// one keyspace, so this is the only storage knob the service has.
    #[derive(Debug, Clone)]
    pub struct StoreConfig {
        /// Redis connection string. Ignored when the in-memory backend
        /// is selected via `ROOMS_STORE_TYPE=memory`.
        pub redis_url: String,
    }

    impl StoreConfig {
        /// Builds a [`StoreConfig`] from environment variables.
        pub fn from_env() -> Result<Self> {
            // ---
            let redis_url = std::env::var("ROOMS_REDIS_URL")
                .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());

            Ok(Self { redis_url })
        }
    }
}
pub use store::StoreConfig;

// ============================================================
// Auth configuration
// ============================================================

mod auth {
    // ---
    use super::*;

    /// Login credential configuration.
    ///
    /// The token secret signs the stateless login tokens and must be
    /// explicitly provided; there is no safe default for it.
    #[derive(Debug, Clone)]
    pub struct AuthConfig {
        /// Secret used to sign and verify login tokens.
        pub token_secret: String,

        /// Lifetime of a signed login token, in days. Defaults to 30.
        pub token_ttl_days: i64,

        /// Lifetime of a server-side session, in days. Defaults to 30.
        pub session_ttl_days: i64,
    }

    impl AuthConfig {
        /// Builds an [`AuthConfig`] from environment variables.
        ///
        /// # Errors
        /// Fails when the token secret is absent; it has no default.
        pub fn from_env() -> Result<Self> {
            // ---
            let token_secret = required_env!("ROOMS_TOKEN_SECRET");
            let token_ttl_days = optional_env_parse!("ROOMS_TOKEN_TTL_DAYS", i64, 30);
            let session_ttl_days = optional_env_parse!("ROOMS_SESSION_TTL_DAYS", i64, 30);

            Ok(Self {
                token_secret,
                token_ttl_days,
                session_ttl_days,
            })
        }

        pub fn token_ttl(&self) -> chrono::Duration {
            // ---
            chrono::Duration::days(self.token_ttl_days)
        }

        pub fn session_ttl(&self) -> chrono::Duration {
            // ---
            chrono::Duration::days(self.session_ttl_days)
        }

        /// Max-Age for the login cookies, in seconds.
        pub fn cookie_max_age_secs(&self) -> i64 {
            // ---
            self.session_ttl_days * 24 * 60 * 60
        }
    }
}
pub use auth::AuthConfig;

// ============================================================
// Server configuration
// ============================================================

mod server {
    // ---
    use super::*;

    /// HTTP listener configuration.
    #[derive(Debug, Clone)]
    pub struct ServerConfig {
        /// Socket address to bind. Defaults to 127.0.0.1:8080.
        pub bind_addr: String,
    }

    impl ServerConfig {
        /// Builds a [`ServerConfig`] from environment variables.
        pub fn from_env() -> Result<Self> {
            // ---
            let bind_addr =
                std::env::var("ROOMS_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());

            Ok(Self { bind_addr })
        }
    }
}
pub use server::ServerConfig;

// ============================================================
// Tests
// ============================================================
