//! Response types for the pricing API.
//!
//! These mirror the server's JSON bodies. Prices keep the exact decimal
//! representation sent on the wire.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};


// ============================================================================
// Health
// ============================================================================

/// Health check response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}

/// Readiness check response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadinessResponse {
    /// Readiness status.
    pub status: String,
    /// Name of the backing price repository.
    pub repository: String,
}

// ============================================================================
// Prices
// ============================================================================

/// Sampled daily price for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceDto {
    /// Identifier of the stored price row.
    pub id: i64,
    /// Ticker symbol.
    pub ticker: String,
    /// Date of the stored price.
    pub date: NaiveDate,
    /// Opening price.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub open: Decimal,
    /// Closing price.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub close: Decimal,
    /// High price.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub high: Decimal,
    /// Low price.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub low: Decimal,
    /// Volume field as reported by the service.
    pub volume: i64,
}

// ============================================================================
// Errors & Metrics
// ============================================================================

/// Error body returned by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message.
    pub error: String,
    /// Error code.
    pub code: String,
}

/// One cumulative histogram bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketSnapshot {
    /// Inclusive upper bound in milliseconds.
    pub le_ms: u64,
    /// Requests at or below the bound.
    pub count: u64,
}

/// Metrics for one `(method, path, status)` series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
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

/// Request metrics snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Requests currently being served.
    pub in_flight: i64,
    /// Recorded series.
    pub series: Vec<SeriesSnapshot>,
}

impl MetricsSnapshot {
    /// Total requests recorded for `path` across methods and statuses.
    #[must_use]
    pub fn count_for_path(&self, path: &str) -> u64 {
        self.series
            .iter()
            .filter(|series| series.path == path)
            .map(|series| series.count)
            .sum()
    }
}
