//! Application state management.
//!
//! Handlers receive one `AppState` per request through Axum's `State`
//! extractor. It bundles the storage facade, the metrics backend, and
//! the auth settings; cloning it is cheap because the heavy members are
//! `Arc`-backed.

use crate::config::AuthConfig;
use crate::domain::MetricsPtr;
use crate::storage::Database;

/// The dependency container every handler works out of.
///
/// Built once in `create_router()`, attached with `.with_state(..)`, and
/// cloned by Axum per request. Handlers only see abstractions: the
/// `KvStore` trait behind `Database`, the `Metrics` trait behind
/// `MetricsPtr`. Nothing in here is mutated after startup; all mutable
/// state lives behind the store.
#[derive(Clone)]
pub(crate) struct AppState {
    /// Storage facade over the configured key-value backend.
    ///
    /// Hands out per-entity stores (users, rooms, progress, sessions).
    db: Database,

    /// Event counters and request timings, Prometheus or no-op.
    metrics: MetricsPtr,

    /// Login credential settings: token secret and credential lifetimes.
    auth: AuthConfig,
}

impl AppState {
    // ---

    pub fn new(db: Database, metrics: MetricsPtr, auth: AuthConfig) -> Self {
        // ---
        AppState { db, metrics, auth }
    }

    /// The storage facade.
    pub(crate) fn db(&self) -> &Database {
        // ---
        &self.db
    }

    /// The metrics backend.
    pub(crate) fn metrics(&self) -> &MetricsPtr {
        // ---
        &self.metrics
    }

    /// The auth settings.
    pub(crate) fn auth(&self) -> &AuthConfig {
        // ---
        &self.auth
    }
}
