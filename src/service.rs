//! Price lookups with request-time sampling.

use crate::db::PriceRecord;
use crate::error::ApiError;
use crate::models::PriceDto;
use crate::repository::PriceRepository;
use crate::sampler::PriceSampler;
use std::sync::Arc;
use tracing::debug;

/// Serves sampled prices from a repository.
#[derive(Clone)]
pub struct PriceService {
    repository: Arc<dyn PriceRepository>,
    sampler: PriceSampler,
}

impl PriceService {
    /// Creates a service over `repository`.
    #[must_use]
    pub fn new(repository: Arc<dyn PriceRepository>) -> Self {
        Self {
            repository,
            sampler: PriceSampler::new(),
        }
    }

    /// Returns the backing repository.
    #[must_use]
    pub fn repository(&self) -> &Arc<dyn PriceRepository> {
        &self.repository
    }

    /// Samples every stored record, keeping repository order.
    ///
    /// # Errors
    /// Returns [`ApiError::Database`] if the repository query fails.
    pub async fn get_all_prices(&self) -> Result<Vec<PriceDto>, ApiError> {
        let records = self.repository.get_all().await?;
        debug!(count = records.len(), "Sampling all prices");

        Ok(records
            .iter()
            .map(|record| self.to_sampled_dto(record))
            .collect())
    }

    /// Samples the first stored record for `ticker`.
    ///
    /// # Errors
    /// Returns [`ApiError::PriceNotFound`] if the ticker has no records, or
    /// [`ApiError::Database`] if the repository query fails.
    pub async fn get_price_by_ticker(&self, ticker: &str) -> Result<PriceDto, ApiError> {
        let records = self.repository.get_by_ticker(ticker).await?;
        let record = records
            .first()
            .ok_or_else(|| ApiError::PriceNotFound(ticker.to_string()))?;

        Ok(self.to_sampled_dto(record))
    }

    /// Maps `record` to a DTO carrying a freshly sampled price.
    #[must_use]
    pub fn to_sampled_dto(&self, record: &PriceRecord) -> PriceDto {
        let sampled = self
            .sampler
            .sample(&record.ticker, record.price, record.price_std);
        PriceDto::from_record(record, sampled.price)
    }
}
