//! Request and response models for the REST API.

use crate::db::PriceRecord;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Sampled daily price for one ticker.
///
/// `open`, `close`, `high` and `low` always carry the same sampled value;
/// intraday movement is not modelled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PriceDto {
    /// Identifier of the stored price row.
    pub id: i64,
    /// Ticker symbol.
    #[schema(example = "AAPL")]
    pub ticker: String,
    /// Date the stored mean and deviation apply to.
    pub date: NaiveDate,
    /// Opening price.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    #[schema(value_type = f64, example = 187.25)]
    pub open: Decimal,
    /// Closing price.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    #[schema(value_type = f64, example = 187.25)]
    pub close: Decimal,
    /// High price.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    #[schema(value_type = f64, example = 187.25)]
    pub high: Decimal,
    /// Low price.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    #[schema(value_type = f64, example = 187.25)]
    pub low: Decimal,
    /// Stored standard deviation truncated to an integer.
    pub volume: i64,
}

impl PriceDto {
    /// Builds a DTO for `record` with all four OHLC fields set to `price`.
    #[must_use]
    pub fn from_record(record: &PriceRecord, price: Decimal) -> Self {
        Self {
            id: i64::from(record.id),
            ticker: record.ticker.clone(),
            date: record.price_date,
            open: price,
            close: price,
            high: price,
            low: price,
            // Carried over from the upstream DTO mapping; the value has no
            // trading meaning.
            volume: record.price_std as i64,
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}

/// Readiness check response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReadinessResponse {
    /// Readiness status.
    pub status: String,
    /// Name of the backing price repository.
    pub repository: String,
}
