use std::time::Instant;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::app_state::AppState;

/// Handler for the `/metrics` endpoint.
///
/// Serves whatever the configured backend renders: a Prometheus text
/// exposition, or an empty body when recording is switched off.
pub async fn metrics_handler(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, StatusCode> {
    // ---

    let metrics_text = app_state.metrics().render();

    Ok((
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        metrics_text,
    ))
}

/// Request-spanning middleware that feeds the HTTP latency histogram.
///
/// Wraps every route; the configured metrics backend decides what, if
/// anything, gets recorded.
pub async fn track_http_metrics(
    State(app_state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    // ---
    let start = Instant::now();
    let path = request.uri().path().to_owned();
    let method = request.method().to_string();

    let response = next.run(request).await;

    app_state
        .metrics()
        .record_http_request(start, &path, &method, response.status().as_u16());
    response
}
