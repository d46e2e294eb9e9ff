use std::sync::Arc;
use std::time::Instant;

/// Counters and timings the service emits, backend-agnostic.
pub trait Metrics: Send + Sync + 'static {
    // ---
    /// Current metrics as a Prometheus text exposition.
    fn render(&self) -> String;

    /// Count a completed signup.
    fn record_user_signup(&self);

    /// Count a freshly created room.
    fn record_room_created(&self);

    /// Count an accepted progress submission.
    fn record_progress_submitted(&self);

    /// Time one finished HTTP request.
    fn record_http_request(&self, start: Instant, path: &str, method: &str, status: u16);
}

/// Type alias for any backend that implements Metrics.
pub type MetricsPtr = Arc<dyn Metrics>;
