// src/infrastructure/metrics/noop/mod.rs
mod noop_metrics;

pub use noop_metrics::NoopMetrics;
use std::sync::Arc;

/// Creates the do-nothing metrics backend.
///
/// Every recording call is swallowed and `render` yields an empty body.
/// This is the default backend for tests and local runs where nothing
/// scrapes the process.
pub fn create() -> anyhow::Result<crate::domain::MetricsPtr> {
    Ok(Arc::new(NoopMetrics::new()))
}
