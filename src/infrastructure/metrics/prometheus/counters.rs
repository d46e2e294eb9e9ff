use metrics::{counter, histogram};
use std::time::Instant;

/// Increment a counter for completed signups.
pub fn increment_user_signup() {
    counter!("users_signed_up_total").increment(1);
}

/// Increment a counter for created rooms.
pub fn increment_room_created() {
    counter!("rooms_created_total").increment(1);
}

/// Increment a counter for accepted progress submissions.
pub fn increment_progress_submitted() {
    counter!("progress_submissions_total").increment(1);
}

/// Feed one request's wall-clock latency into the duration histogram.
pub fn track_http_request(start: Instant) {
    let elapsed = start.elapsed();
    histogram!("http_request_duration_seconds").record(elapsed);
}
