//! Application state management.

use crate::cache::CachedPriceRepository;
use crate::metrics::HttpMetrics;
use crate::repository::PriceRepository;
use crate::service::PriceService;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Sampled price lookups.
    pub prices: PriceService,
    /// Request metrics registry.
    pub metrics: Arc<HttpMetrics>,
}

impl AppState {
    /// Creates a new application state over an uncached repository.
    #[must_use]
    pub fn new(repository: Arc<dyn PriceRepository>) -> Self {
        Self {
            prices: PriceService::new(repository),
            metrics: Arc::new(HttpMetrics::new()),
        }
    }

    /// Creates a new application state, caching repository results for `ttl`.
    ///
    /// A zero `ttl` leaves the repository uncached.
    #[must_use]
    pub fn with_cache(repository: Arc<dyn PriceRepository>, ttl: Duration) -> Self {
        if ttl.is_zero() {
            info!(repository = repository.name(), "Repository cache disabled");
            return Self::new(repository);
        }

        info!(
            repository = repository.name(),
            ttl_ms = ttl.as_millis() as u64,
            "Repository cache enabled"
        );
        Self::new(Arc::new(CachedPriceRepository::new(repository, ttl)))
    }
}
