//! One-time loading of price data from CSV.
//!
//! The seed file holds many trading dates. A single date is chosen (the
//! configured one, or a random date present in the file) and only that date's
//! rows are loaded, so the service always serves one day's worth of prices.

use crate::config::SeedConfig;
use crate::db::{DatabasePool, NewPriceRecord};
use crate::repository::{InMemoryPriceRepository, RepositoryError};
use chrono::NaiveDate;
use rand::seq::IndexedRandom;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::str::FromStr;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
struct CsvRow {
    price_date: NaiveDate,
    ticker: String,
    price: String,
    price_std: f64,
}

/// Parses seed rows from CSV with a `price_date,ticker,price,price_std` header.
///
/// # Errors
/// Returns [`RepositoryError::Seed`] on malformed rows or prices.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<NewPriceRecord>, RepositoryError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    csv_reader
        .deserialize::<CsvRow>()
        .enumerate()
        .map(|(index, row)| {
            let row = row.map_err(|e| RepositoryError::Seed(format!("row {}: {e}", index + 1)))?;
            let price = Decimal::from_str(&row.price).map_err(|e| {
                RepositoryError::Seed(format!("row {}: invalid price {}: {e}", index + 1, row.price))
            })?;

            Ok(NewPriceRecord {
                price_date: row.price_date,
                ticker: row.ticker,
                price,
                price_std: row.price_std,
            })
        })
        .collect()
}

/// Picks the date to load: `requested` if given, otherwise a random date among `rows`.
#[must_use]
pub fn select_date(rows: &[NewPriceRecord], requested: Option<NaiveDate>) -> Option<NaiveDate> {
    if requested.is_some() {
        return requested;
    }

    let dates: Vec<NaiveDate> = rows
        .iter()
        .map(|row| row.price_date)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    dates.choose(&mut rand::rng()).copied()
}

/// Reads the seed file and keeps the rows of the selected date.
///
/// # Errors
/// Returns [`RepositoryError::Seed`] if the file cannot be read or holds no
/// rows for the selected date.
pub fn load_rows(config: &SeedConfig) -> Result<(NaiveDate, Vec<NewPriceRecord>), RepositoryError> {
    let file = File::open(&config.csv_path).map_err(|e| {
        RepositoryError::Seed(format!("cannot open {}: {e}", config.csv_path.display()))
    })?;

    let rows = read_rows(file)?;
    let date = select_date(&rows, config.date).ok_or_else(|| {
        RepositoryError::Seed(format!("{} contains no rows", config.csv_path.display()))
    })?;

    let selected: Vec<NewPriceRecord> = rows
        .into_iter()
        .filter(|row| row.price_date == date)
        .collect();

    if selected.is_empty() {
        return Err(RepositoryError::Seed(format!("no rows for {date}")));
    }

    Ok((date, selected))
}

/// Builds an in-memory repository from the seed file.
///
/// # Errors
/// Returns [`RepositoryError::Seed`] if seed data cannot be loaded.
pub fn load_in_memory(config: &SeedConfig) -> Result<InMemoryPriceRepository, RepositoryError> {
    if !config.enabled {
        warn!("Seeding disabled, in-memory repository is empty");
        return Ok(InMemoryPriceRepository::default());
    }

    let (date, rows) = load_rows(config)?;
    info!(%date, count = rows.len(), "Loaded in-memory prices");

    Ok(InMemoryPriceRepository::from_new_records(rows))
}

/// Inserts seed rows when the `price` table is empty.
///
/// # Returns
/// Number of inserted rows; zero if the table already had data.
///
/// # Errors
/// Returns error if seed data cannot be loaded or inserted.
pub async fn seed_if_empty(db: &DatabasePool, config: &SeedConfig) -> Result<u64, RepositoryError> {
    let (existing,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM price")
        .fetch_one(db.pool())
        .await?;

    if existing > 0 {
        info!(existing, "Price table already seeded");
        return Ok(0);
    }

    let (date, rows) = load_rows(config)?;
    let mut tx = db.pool().begin().await?;

    for row in &rows {
        sqlx::query(
            r#"
            INSERT INTO price (price_date, ticker, price, price_std)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(row.price_date)
        .bind(&row.ticker)
        .bind(row.price)
        .bind(row.price_std)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    let inserted = rows.len() as u64;
    info!(%date, inserted, "Seeded price table");
    Ok(inserted)
}
