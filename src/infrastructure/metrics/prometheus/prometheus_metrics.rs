//! Prometheus-backed implementation of the `Metrics` trait.
//!
//! Recording goes through the global registry of the `metrics` crate;
//! the sibling modules hold the moving parts (`counters.rs` defines the
//! instruments, `recorder.rs` owns the process-global handle that
//! renders them).

use crate::domain::Metrics;
use std::time::Instant;

/// Zero-sized on purpose: every instrument lives in the global registry,
/// so an instance carries no state of its own.
pub struct PrometheusMetrics;

impl PrometheusMetrics {
    pub fn new() -> Self {
        tracing::info!("Creating Prometheus metrics");
        PrometheusMetrics
    }
}

impl Metrics for PrometheusMetrics {
    // ---
    fn render(&self) -> String {
        super::render_metrics()
    }

    fn record_user_signup(&self) {
        tracing::debug!("Recording user signup event");
        super::increment_user_signup();
    }

    fn record_room_created(&self) {
        tracing::debug!("Recording room created event");
        super::increment_room_created();
    }

    fn record_progress_submitted(&self) {
        tracing::debug!("Recording progress submitted event");
        super::increment_progress_submitted();
    }

    fn record_http_request(&self, start: Instant, _path: &str, _method: &str, _status: u16) {
        tracing::debug!("Recording HTTP request duration");
        super::track_http_request(start);
    }
}
