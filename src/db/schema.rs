//! Database schema types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Stored price row from the `price` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PriceRecord {
    /// Unique identifier.
    pub id: i32,
    /// Date the mean and deviation apply to.
    pub price_date: NaiveDate,
    /// Ticker symbol (e.g., "AAPL").
    pub ticker: String,
    /// Mean price, NUMERIC(18, 8).
    pub price: Decimal,
    /// Standard deviation of the price.
    pub price_std: f64,
    /// Optimistic locking version.
    pub version: i32,
}

/// Price row to be inserted; identity and version are assigned by the database.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPriceRecord {
    /// Date the mean and deviation apply to.
    pub price_date: NaiveDate,
    /// Ticker symbol.
    pub ticker: String,
    /// Mean price.
    pub price: Decimal,
    /// Standard deviation of the price.
    pub price_std: f64,
}
