mod counters;
mod prometheus_metrics;
mod recorder;

pub use prometheus_metrics::PrometheusMetrics;
use std::sync::Arc;

// Plumbing shared across this module's files
pub(crate) use counters::{
    increment_progress_submitted, increment_room_created, increment_user_signup,
    track_http_request,
};
pub(crate) use recorder::{init_metrics, render_metrics};

/// Creates the Prometheus metrics backend, installing the process-global
/// recorder on first use. Whatever it collects is what `/metrics` serves.
pub fn create() -> anyhow::Result<crate::domain::MetricsPtr> {
    tracing::info!("Initializing Prometheus metrics");
    init_metrics();

    Ok(Arc::new(PrometheusMetrics::new()))
}
