//! Prometheus metrics for the API server.

use std::sync::LazyLock;
use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use regex_lite::Regex;

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "photoreel_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "photoreel_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "photoreel_http_requests_in_flight";

    // Slideshow metrics
    pub const SLIDESHOWS_TOTAL: &str = "photoreel_slideshows_total";
    pub const SLIDESHOW_DURATION_SECONDS: &str = "photoreel_slideshow_duration_seconds";
    pub const SLIDESHOW_FRAMES: &str = "photoreel_slideshow_frames";

    // Rate limiting metrics
    pub const RATE_LIMIT_HITS_TOTAL: &str = "photoreel_rate_limit_hits_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a finished slideshow request.
pub fn record_slideshow(outcome: &str, duration_secs: f64) {
    let labels = [("outcome", outcome.to_string())];
    counter!(names::SLIDESHOWS_TOTAL, &labels).increment(1);
    histogram!(names::SLIDESHOW_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record how many frames went into an encoded slideshow.
pub fn record_slideshow_frames(frames: usize) {
    histogram!(names::SLIDESHOW_FRAMES).record(frames as f64);
}

/// Record rate limit hit.
pub fn record_rate_limit_hit(endpoint: &str) {
    let labels = [("endpoint", sanitize_path(endpoint))];
    counter!(names::RATE_LIMIT_HITS_TOTAL, &labels).increment(1);
}

static NUMERIC_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/[0-9]+(/|$)").expect("valid regex"));

/// Sanitize path for metrics labels (numeric ids become `:id`).
fn sanitize_path(path: &str) -> String {
    // Run twice so adjacent id segments both get replaced.
    let path = NUMERIC_SEGMENT.replace_all(path, "/:id$1");
    NUMERIC_SEGMENT.replace_all(&path, "/:id$1").into_owned()
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path() {
        assert_eq!(sanitize_path("/api/photos/42/image"), "/api/photos/:id/image");
        assert_eq!(sanitize_path("/api/albums/7"), "/api/albums/:id");
        assert_eq!(sanitize_path("/api/generate-video"), "/api/generate-video");
    }
}
