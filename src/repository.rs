//! Read-only access to stored prices.

use crate::db::{DatabasePool, NewPriceRecord, PriceRecord};
use async_trait::async_trait;
use tracing::debug;


/// Repository error types.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Query or connection failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Seed data could not be loaded.
    #[error("seed error: {0}")]
    Seed(String),
}

/// Source of stored price records.
#[async_trait]
pub trait PriceRepository: Send + Sync {
    /// Returns every stored record in the repository's natural order.
    async fn get_all(&self) -> Result<Vec<PriceRecord>, RepositoryError>;

    /// Returns the records for `ticker`, empty if there are none.
    async fn get_by_ticker(&self, ticker: &str) -> Result<Vec<PriceRecord>, RepositoryError>;

    /// Checks that the repository can serve queries.
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    /// Short name used in logs and readiness responses.
    fn name(&self) -> &'static str;
}

// ============================================================================
// PostgreSQL
// ============================================================================

/// Repository backed by the `price` table.
#[derive(Clone)]
pub struct PgPriceRepository {
    db: DatabasePool,
}

impl PgPriceRepository {
    /// Creates a repository over the given pool.
    #[must_use]
    pub fn new(db: DatabasePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PriceRepository for PgPriceRepository {
    async fn get_all(&self) -> Result<Vec<PriceRecord>, RepositoryError> {
        let records = sqlx::query_as::<_, PriceRecord>(
            r#"
            SELECT id, price_date, ticker, price, price_std, version
            FROM price
            ORDER BY id
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        debug!(count = records.len(), "Loaded all prices");
        Ok(records)
    }

    async fn get_by_ticker(&self, ticker: &str) -> Result<Vec<PriceRecord>, RepositoryError> {
        let records = sqlx::query_as::<_, PriceRecord>(
            r#"
            SELECT id, price_date, ticker, price, price_std, version
            FROM price
            WHERE ticker = $1
            ORDER BY id
            "#,
        )
        .bind(ticker)
        .fetch_all(self.db.pool())
        .await?;

        debug!(ticker, count = records.len(), "Loaded prices for ticker");
        Ok(records)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(self.db.pool()).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}

// ============================================================================
// In-memory
// ============================================================================

/// Repository holding a fixed set of records in insertion order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPriceRepository {
    records: Vec<PriceRecord>,
}

impl InMemoryPriceRepository {
    /// Creates a repository over existing records.
    #[must_use]
    pub fn new(records: Vec<PriceRecord>) -> Self {
        Self { records }
    }

    /// Creates a repository from new rows, assigning sequential ids from 1.
    #[must_use]
    pub fn from_new_records(rows: Vec<NewPriceRecord>) -> Self {
        let records = rows
            .into_iter()
            .zip(1..)
            .map(|(row, id)| PriceRecord {
                id,
                price_date: row.price_date,
                ticker: row.ticker,
                price: row.price,
                price_std: row.price_std,
                version: 1,
            })
            .collect();

        Self { records }
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no records are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl PriceRepository for InMemoryPriceRepository {
    async fn get_all(&self) -> Result<Vec<PriceRecord>, RepositoryError> {
        Ok(self.records.clone())
    }

    async fn get_by_ticker(&self, ticker: &str) -> Result<Vec<PriceRecord>, RepositoryError> {
        Ok(self
            .records
            .iter()
            .filter(|record| record.ticker == ticker)
            .cloned()
            .collect())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
