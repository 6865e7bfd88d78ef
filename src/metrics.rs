//! HTTP request metrics.
//!
//! Records a request counter, a duration histogram and an in-flight gauge per
//! `(method, route, status)` series. Routes are labelled by their template
//! (`/api/v1/price/{ticker}`), never by the concrete URI.

use dashmap::DashMap;
use serde::Serialize;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;
use utoipa::ToSchema;

/// Upper bounds of the duration histogram buckets, in milliseconds.
pub const DURATION_BUCKETS_MS: [u64; 11] = [5, 10, 25, 50, 100, 250, 500, 1000, 2500, 5000, 10000];

/// Label used for requests that matched no route.
pub const UNMATCHED_PATH: &str = "unmatched";

/// Sink for per-request measurements.
pub trait RequestRecorder: Send + Sync {
    /// Records one completed request.
    fn record(&self, method: &str, path: &str, status: u16, duration: Duration);

    /// Marks a request as started.
    fn request_started(&self) {}

    /// Marks a started request as finished.
    fn request_finished(&self) {}
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SeriesKey {
    method: String,
    path: String,
    status: u16,
}

#[derive(Debug, Clone, Default)]
struct SeriesStats {
    count: u64,
    sum_ms: f64,
    /// Per-bucket counts, not cumulative; the last slot holds overflow.
    buckets: [u64; DURATION_BUCKETS_MS.len() + 1],
}

/// In-process metrics registry.
#[derive(Debug, Default)]
pub struct HttpMetrics {
    series: DashMap<SeriesKey, SeriesStats>,
    in_flight: AtomicI64,
}

/// One cumulative histogram bucket.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BucketSnapshot {
    /// Inclusive upper bound in milliseconds.
    pub le_ms: u64,
    /// Requests at or below the bound.
    pub count: u64,
}

/// Metrics for one `(method, path, status)` series.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SeriesSnapshot {
    /// HTTP method.
    pub method: String,
    /// Route template.
    pub path: String,
    /// Response status code.
    pub status: u16,
    /// Total requests.
    pub count: u64,
    /// Sum of request durations in milliseconds.
    pub sum_ms: f64,
    /// Cumulative duration buckets.
    pub buckets: Vec<BucketSnapshot>,
}

/// Point-in-time view of all recorded metrics.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MetricsSnapshot {
    /// Requests currently being served.
    pub in_flight: i64,
    /// Recorded series sorted by path, method and status.
    pub series: Vec<SeriesSnapshot>,
}

impl HttpMetrics {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests currently in flight.
    #[must_use]
    pub fn in_flight(&self) -> i64 {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Returns a snapshot of every series.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        let mut series: Vec<SeriesSnapshot> = self
            .series
            .iter()
            .map(|entry| {
                let key = entry.key();
                let stats = entry.value();
                let mut cumulative = 0;
                let buckets = DURATION_BUCKETS_MS
                    .iter()
                    .zip(stats.buckets.iter())
                    .map(|(&le_ms, &count)| {
                        cumulative += count;
                        BucketSnapshot {
                            le_ms,
                            count: cumulative,
                        }
                    })
                    .collect();

                SeriesSnapshot {
                    method: key.method.clone(),
                    path: key.path.clone(),
                    status: key.status,
                    count: stats.count,
                    sum_ms: stats.sum_ms,
                    buckets,
                }
            })
            .collect();

        series.sort_by(|a, b| {
            (&a.path, &a.method, a.status).cmp(&(&b.path, &b.method, b.status))
        });

        MetricsSnapshot {
            in_flight: self.in_flight(),
            series,
        }
    }
}

impl RequestRecorder for HttpMetrics {
    fn record(&self, method: &str, path: &str, status: u16, duration: Duration) {
        let key = SeriesKey {
            method: normalize_method(method),
            path: if path.is_empty() {
                UNMATCHED_PATH.to_string()
            } else {
                path.to_string()
            },
            status,
        };

        let millis = duration.as_micros() as f64 / 1000.0;
        let bucket = DURATION_BUCKETS_MS
            .iter()
            .position(|&le| millis <= le as f64)
            .unwrap_or(DURATION_BUCKETS_MS.len());

        let mut stats = self.series.entry(key).or_default();
        stats.count += 1;
        stats.sum_ms += millis;
        stats.buckets[bucket] += 1;
    }

    fn request_started(&self) {
        self.in_flight.fetch_add(1, Ordering::Relaxed);
    }

    fn request_finished(&self) {
        self.in_flight.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Uppercases a method name, mapping blanks to `UNKNOWN`.
#[must_use]
pub fn normalize_method(method: &str) -> String {
    let method = method.trim();
    if method.is_empty() {
        "UNKNOWN".to_string()
    } else {
        method.to_uppercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_method() {
        assert_eq!(normalize_method("get"), "GET");
        assert_eq!(normalize_method(" Post "), "POST");
        assert_eq!(normalize_method(""), "UNKNOWN");
        assert_eq!(normalize_method("   "), "UNKNOWN");
    }

    #[test]
    fn test_record_counts_per_series() {
        let metrics = HttpMetrics::new();
        metrics.record("GET", "/api/v1/prices", 200, Duration::from_millis(3));
        metrics.record("GET", "/api/v1/prices", 200, Duration::from_millis(7));
        metrics.record("GET", "/api/v1/price/{ticker}", 404, Duration::from_millis(1));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.series.len(), 2);

        let prices = snapshot
            .series
            .iter()
            .find(|s| s.path == "/api/v1/prices")
            .unwrap();
        assert_eq!(prices.count, 2);
        assert_eq!(prices.status, 200);
        assert!((prices.sum_ms - 10.0).abs() < 1e-9);

        let missing = snapshot
            .series
            .iter()
            .find(|s| s.status == 404)
            .unwrap();
        assert_eq!(missing.path, "/api/v1/price/{ticker}");
        assert_eq!(missing.count, 1);
    }

    #[test]
    fn test_buckets_are_cumulative() {
        let metrics = HttpMetrics::new();
        metrics.record("GET", "/x", 200, Duration::from_millis(3));
        metrics.record("GET", "/x", 200, Duration::from_millis(30));
        metrics.record("GET", "/x", 200, Duration::from_millis(30_000));

        let snapshot = metrics.snapshot();
        let series = &snapshot.series[0];
        let counts: Vec<u64> = series.buckets.iter().map(|b| b.count).collect();

        assert_eq!(series.buckets.len(), DURATION_BUCKETS_MS.len());
        assert_eq!(counts, vec![1, 1, 1, 2, 2, 2, 2, 2, 2, 2, 2]);
        assert_eq!(series.count, 3);
    }

    #[test]
    fn test_bucket_bounds_are_inclusive() {
        let metrics = HttpMetrics::new();
        metrics.record("GET", "/x", 200, Duration::from_millis(5));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.series[0].buckets[0].le_ms, 5);
        assert_eq!(snapshot.series[0].buckets[0].count, 1);
    }

    #[test]
    fn test_method_normalized_in_series() {
        let metrics = HttpMetrics::new();
        metrics.record("get", "/x", 200, Duration::ZERO);
        metrics.record("GET", "/x", 200, Duration::ZERO);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.series.len(), 1);
        assert_eq!(snapshot.series[0].method, "GET");
    }

    #[test]
    fn test_empty_path_labelled_unmatched() {
        let metrics = HttpMetrics::new();
        metrics.record("GET", "", 404, Duration::ZERO);
        assert_eq!(metrics.snapshot().series[0].path, UNMATCHED_PATH);
    }

    #[test]
    fn test_in_flight_gauge() {
        let metrics = HttpMetrics::new();
        metrics.request_started();
        metrics.request_started();
        assert_eq!(metrics.in_flight(), 2);

        metrics.request_finished();
        assert_eq!(metrics.snapshot().in_flight, 1);
    }

    #[test]
    fn test_concurrent_recording() {
        let metrics = std::sync::Arc::new(HttpMetrics::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let metrics = metrics.clone();
                std::thread::spawn(move || {
                    for _ in 0..500 {
                        metrics.record("GET", "/api/v1/prices", 200, Duration::from_millis(1));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(metrics.snapshot().series[0].count, 4000);
    }

    #[test]
    fn test_snapshot_serialization() {
        let metrics = HttpMetrics::new();
        metrics.record("GET", "/health", 200, Duration::from_millis(1));

        let json = serde_json::to_string(&metrics.snapshot()).unwrap();
        assert!(json.contains("\"in_flight\":0"));
        assert!(json.contains("\"path\":\"/health\""));
        assert!(json.contains("\"le_ms\":5"));
    }
}
