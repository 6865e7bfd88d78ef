//! API middleware for request metrics.

use crate::metrics::{RequestRecorder, UNMATCHED_PATH};
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{MatchedPath, State},
    http::Request,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;

/// Decrements the in-flight gauge when the request finishes or is dropped.
struct InFlightGuard<'a> {
    recorder: &'a dyn RequestRecorder,
}

impl<'a> InFlightGuard<'a> {
    fn start(recorder: &'a dyn RequestRecorder) -> Self {
        recorder.request_started();
        Self { recorder }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.recorder.request_finished();
    }
}

/// Metrics middleware.
///
/// Records method, route template, status code and duration of every request,
/// and tracks requests in flight.
pub async fn metrics_middleware(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let method = request.method().as_str().to_string();
    let path = route_label(&request);
    let recorder: &dyn RequestRecorder = state.metrics.as_ref();

    let started = Instant::now();
    let _in_flight = InFlightGuard::start(recorder);

    let response = next.run(request).await;

    recorder.record(
        &method,
        &path,
        response.status().as_u16(),
        started.elapsed(),
    );

    response
}

/// Returns the matched route template, or [`UNMATCHED_PATH`].
fn route_label(request: &Request<Body>) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_PATH.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::HttpMetrics;
    use std::time::Duration;

    #[test]
    fn test_route_label_unmatched() {
        let request = Request::builder()
            .uri("/nowhere")
            .body(Body::empty())
            .unwrap();

        assert_eq!(route_label(&request), UNMATCHED_PATH);
    }

    #[test]
    fn test_in_flight_guard_decrements_on_drop() {
        let metrics = HttpMetrics::new();
        {
            let _guard = InFlightGuard::start(&metrics);
            assert_eq!(metrics.in_flight(), 1);
        }
        assert_eq!(metrics.in_flight(), 0);
    }

    #[test]
    fn test_in_flight_guard_nested() {
        let metrics = HttpMetrics::new();
        let outer = InFlightGuard::start(&metrics);
        let inner = InFlightGuard::start(&metrics);
        assert_eq!(metrics.in_flight(), 2);

        drop(inner);
        assert_eq!(metrics.in_flight(), 1);
        drop(outer);
        assert_eq!(metrics.in_flight(), 0);

        metrics.record("GET", "/x", 200, Duration::ZERO);
        assert_eq!(metrics.snapshot().in_flight, 0);
    }
}
