//! Short-lived memoization of repository queries.
//!
//! Only the stored records are cached. Sampling runs after the cache on every
//! request, so a cached record is still perturbed afresh each time it is served.

use crate::db::PriceRecord;
use crate::repository::{PriceRepository, RepositoryError};
use async_trait::async_trait;
use dashmap::DashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::trace;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

/// Thread-safe map whose entries expire a fixed time after insertion.
///
/// Expired entries are evicted when read, and swept in bulk by `insert` at
/// most once per TTL, so keys that are never read again do not accumulate.
#[derive(Debug)]
pub struct TtlCache<K, V>
where
    K: Eq + Hash,
{
    entries: DashMap<K, CacheEntry<V>>,
    ttl: Duration,
    created_at: Instant,
    /// Microseconds after `created_at` of the last sweep.
    last_sweep_us: AtomicU64,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates an empty cache; a zero `ttl` stores nothing.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            created_at: Instant::now(),
            last_sweep_us: AtomicU64::new(0),
        }
    }

    /// Returns a live value for `key`, evicting it if expired.
    pub fn get(&self, key: &K) -> Option<V> {
        if let Some(entry) = self.entries.get(key) {
            if entry.inserted_at.elapsed() < self.ttl {
                return Some(entry.value.clone());
            }
            drop(entry);
            let ttl = self.ttl;
            self.entries
                .remove_if(key, |_, entry| entry.inserted_at.elapsed() >= ttl);
        }
        None
    }

    /// Stores `value` under `key`, replacing any previous entry.
    pub fn insert(&self, key: K, value: V) {
        if self.ttl.is_zero() {
            return;
        }
        self.entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );

        self.sweep_if_due();
    }

    /// Removes expired entries, returning how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries
            .retain(|_, entry| entry.inserted_at.elapsed() < ttl);
        before.saturating_sub(self.entries.len())
    }

    /// Sweeps when a full TTL has passed since the last sweep; one caller wins.
    fn sweep_if_due(&self) {
        let now_us = self.created_at.elapsed().as_micros() as u64;
        let last_us = self.last_sweep_us.load(Ordering::Relaxed);
        if now_us.saturating_sub(last_us) < self.ttl.as_micros() as u64 {
            return;
        }

        if self
            .last_sweep_us
            .compare_exchange(last_us, now_us, Ordering::Relaxed, Ordering::Relaxed)
            .is_ok()
        {
            let purged = self.purge_expired();
            trace!(purged, remaining = self.entries.len(), "swept expired cache entries");
        }
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of stored entries, including expired ones not yet evicted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Repository decorator caching `get_all` and `get_by_ticker` results.
pub struct CachedPriceRepository {
    inner: Arc<dyn PriceRepository>,
    prices: TtlCache<(), Vec<PriceRecord>>,
    prices_by_ticker: TtlCache<String, Vec<PriceRecord>>,
}

impl CachedPriceRepository {
    /// Wraps `inner`, keeping results for `ttl`.
    #[must_use]
    pub fn new(inner: Arc<dyn PriceRepository>, ttl: Duration) -> Self {
        Self {
            inner,
            prices: TtlCache::new(ttl),
            prices_by_ticker: TtlCache::new(ttl),
        }
    }

    /// Drops all cached results.
    pub fn invalidate_all(&self) {
        self.prices.clear();
        self.prices_by_ticker.clear();
    }
}

#[async_trait]
impl PriceRepository for CachedPriceRepository {
    async fn get_all(&self) -> Result<Vec<PriceRecord>, RepositoryError> {
        if let Some(records) = self.prices.get(&()) {
            trace!("prices cache hit");
            return Ok(records);
        }

        let records = self.inner.get_all().await?;
        self.prices.insert((), records.clone());
        Ok(records)
    }

    async fn get_by_ticker(&self, ticker: &str) -> Result<Vec<PriceRecord>, RepositoryError> {
        let key = ticker.to_string();
        if let Some(records) = self.prices_by_ticker.get(&key) {
            trace!(ticker, "prices_by_ticker cache hit");
            return Ok(records);
        }

        let records = self.inner.get_by_ticker(ticker).await?;
        self.prices_by_ticker.insert(key, records.clone());
        Ok(records)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        self.inner.ping().await
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryPriceRepository;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts calls that reach the wrapped repository.
    struct CountingRepository {
        inner: InMemoryPriceRepository,
        all_calls: AtomicUsize,
        ticker_calls: AtomicUsize,
        fail: bool,
    }

    impl CountingRepository {
        fn new(fail: bool) -> Self {
            let record = PriceRecord {
                id: 1,
                price_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                ticker: "AAPL".to_string(),
                price: dec!(100),
                price_std: 1.0,
                version: 1,
            };
            Self {
                inner: InMemoryPriceRepository::new(vec![record]),
                all_calls: AtomicUsize::new(0),
                ticker_calls: AtomicUsize::new(0),
                fail,
            }
        }
    }

    #[async_trait]
    impl PriceRepository for CountingRepository {
        async fn get_all(&self) -> Result<Vec<PriceRecord>, RepositoryError> {
            self.all_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(RepositoryError::Seed("unavailable".to_string()));
            }
            self.inner.get_all().await
        }

        async fn get_by_ticker(&self, ticker: &str) -> Result<Vec<PriceRecord>, RepositoryError> {
            self.ticker_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(RepositoryError::Seed("unavailable".to_string()));
            }
            self.inner.get_by_ticker(ticker).await
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    fn cached(fail: bool, ttl: Duration) -> (Arc<CountingRepository>, CachedPriceRepository) {
        let counting = Arc::new(CountingRepository::new(fail));
        let repo = CachedPriceRepository::new(counting.clone(), ttl);
        (counting, repo)
    }

    #[test]
    fn test_ttl_cache_get_insert() {
        let cache: TtlCache<String, u32> = TtlCache::new(Duration::from_secs(60));
        assert!(cache.get(&"a".to_string()).is_none());

        cache.insert("a".to_string(), 1);
        assert_eq!(cache.get(&"a".to_string()), Some(1));
        assert_eq!(cache.len(), 1);

        cache.insert("a".to_string(), 2);
        assert_eq!(cache.get(&"a".to_string()), Some(2));
    }

    #[test]
    fn test_ttl_cache_zero_ttl_stores_nothing() {
        let cache: TtlCache<u8, u8> = TtlCache::new(Duration::ZERO);
        cache.insert(1, 1);
        assert!(cache.is_empty());
        assert!(cache.get(&1).is_none());
    }

    #[test]
    fn test_ttl_cache_expiry_evicts() {
        let cache: TtlCache<u8, u8> = TtlCache::new(Duration::from_millis(20));
        cache.insert(1, 1);
        std::thread::sleep(Duration::from_millis(40));

        assert!(cache.get(&1).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_ttl_cache_purge_expired() {
        let cache: TtlCache<u32, u32> = TtlCache::new(Duration::from_millis(10));
        for key in 0..10 {
            cache.insert(key, key);
        }
        std::thread::sleep(Duration::from_millis(30));

        assert_eq!(cache.purge_expired(), 10);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_ttl_cache_insert_sweeps_expired_keys() {
        let cache: TtlCache<usize, usize> = TtlCache::new(Duration::from_millis(1));
        for key in 0..5000 {
            cache.insert(key, key);
        }
        std::thread::sleep(Duration::from_millis(20));
        cache.insert(usize::MAX, 0);

        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_ttl_cache_sweep_keeps_live_entries() {
        let cache: TtlCache<usize, usize> = TtlCache::new(Duration::from_secs(60));
        for key in 0..2048 {
            cache.insert(key, key);
        }

        assert_eq!(cache.len(), 2048);
        assert_eq!(cache.get(&0), Some(0));
    }

    #[test]
    fn test_ttl_cache_clear() {
        let cache: TtlCache<u8, u8> = TtlCache::new(Duration::from_secs(60));
        cache.insert(1, 1);
        cache.insert(2, 2);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_get_all_is_cached() {
        let (counting, repo) = cached(false, Duration::from_secs(60));

        for _ in 0..5 {
            assert_eq!(repo.get_all().await.unwrap().len(), 1);
        }
        assert_eq!(counting.all_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_get_by_ticker_cached_per_ticker() {
        let (counting, repo) = cached(false, Duration::from_secs(60));

        repo.get_by_ticker("AAPL").await.unwrap();
        repo.get_by_ticker("AAPL").await.unwrap();
        assert!(repo.get_by_ticker("ZZZZ").await.unwrap().is_empty());
        assert!(repo.get_by_ticker("ZZZZ").await.unwrap().is_empty());

        assert_eq!(counting.ticker_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_expired_entries_are_refetched() {
        let (counting, repo) = cached(false, Duration::from_millis(20));

        repo.get_all().await.unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;
        repo.get_all().await.unwrap();

        assert_eq!(counting.all_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unique_tickers_do_not_accumulate() {
        let (_, repo) = cached(false, Duration::from_millis(1));

        for i in 0..10_000 {
            repo.get_by_ticker(&format!("T{i}")).await.unwrap();
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
        repo.get_by_ticker("AAPL").await.unwrap();

        assert!(
            repo.prices_by_ticker.len() < 100,
            "entries after expiry: {}",
            repo.prices_by_ticker.len()
        );
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let (counting, repo) = cached(true, Duration::from_secs(60));

        assert!(repo.get_all().await.is_err());
        assert!(repo.get_all().await.is_err());
        assert_eq!(counting.all_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_all() {
        let (counting, repo) = cached(false, Duration::from_secs(60));

        repo.get_all().await.unwrap();
        repo.get_by_ticker("AAPL").await.unwrap();
        repo.invalidate_all();
        repo.get_all().await.unwrap();
        repo.get_by_ticker("AAPL").await.unwrap();

        assert_eq!(counting.all_calls.load(Ordering::SeqCst), 2);
        assert_eq!(counting.ticker_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_name_and_ping_delegate() {
        let (_, repo) = cached(false, Duration::from_secs(60));
        assert_eq!(repo.name(), "counting");
        assert!(repo.ping().await.is_ok());
    }
}
