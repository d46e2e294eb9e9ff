use crate::domain::Metrics;
use std::time::Instant;

/// Metrics backend that discards every event.
pub struct NoopMetrics;

impl NoopMetrics {
    pub fn new() -> Self {
        NoopMetrics
    }
}

impl Metrics for NoopMetrics {
    // ---
    fn render(&self) -> String {
        String::new()
    }
    fn record_user_signup(&self) {}
    fn record_room_created(&self) {}
    fn record_progress_submitted(&self) {}
    fn record_http_request(&self, _: Instant, _: &str, _: &str, _: u16) {}
}
