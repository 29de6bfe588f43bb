//! Forecast Resolver
//!
//! Cache-aside lookup: the cache is consulted first, a miss falls through to
//! the upstream provider and the fresh forecast is written back. Cache
//! failures never reach the caller, upstream failures always do.

use std::{sync::Arc, time::Duration};

use thiserror::Error;

use crate::{
    cache::CacheStore,
    domain::{ForecastRecord, LocationKey, UpstreamForecast},
    metrics::Diag,
    provider::{FetchError, ForecastFetcher},
};

/// Lifetime of a written-back forecast
pub const CACHE_TTL: Duration = Duration::from_secs(12 * 60 * 60);

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("weather provider unavailable: {0}")]
    UpstreamUnavailable(String),
    #[error("weather provider sent a bad response: {0}")]
    UpstreamBadResponse(String),
}

impl From<FetchError> for ResolveError {
    fn from(error: FetchError) -> Self {
        match error {
            FetchError::Unavailable(_) | FetchError::Timeout => {
                Self::UpstreamUnavailable(error.to_string())
            }
            FetchError::BadStatus(_) => Self::UpstreamBadResponse(error.to_string()),
        }
    }
}

/// Holds no per-request state, clones share the same store, fetcher and counters
#[derive(Clone)]
pub struct Resolver {
    cache: Arc<dyn CacheStore>,
    fetcher: Arc<dyn ForecastFetcher>,
    diag: Arc<Diag>,
}

impl Resolver {
    pub fn new(cache: Arc<dyn CacheStore>, fetcher: Arc<dyn ForecastFetcher>) -> Self {
        Self {
            cache,
            fetcher,
            diag: Arc::new(Diag::new()),
        }
    }

    pub fn diag(&self) -> Arc<Diag> {
        self.diag.clone()
    }

    pub fn cache_name(&self) -> &'static str {
        self.cache.name()
    }

    /// Returns the forecast for `key`, from cache when a valid entry exists
    ///
    /// # Errors
    /// fails only when the cache could not serve the request and the upstream
    /// provider could not be reached or sent an unusable response
    #[tracing::instrument(name = "resolver::resolve", skip(self), fields(key = %key))]
    pub async fn resolve(&self, key: &LocationKey) -> Result<ForecastRecord, ResolveError> {
        if let Some(record) = self.lookup(key).await {
            self.diag.cache_hit();
            tracing::debug!("cache hit");
            return Ok(record);
        }
        self.diag.cache_miss();

        let record = self.fetch(key).await.inspect_err(|e| {
            self.diag.upstream_error();
            tracing::error!(error = %e, "upstream lookup failed");
        })?;

        self.write_back(&record).await;

        Ok(record)
    }

    async fn lookup(&self, key: &LocationKey) -> Option<ForecastRecord> {
        let bytes = match self.cache.get(key.as_str()).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                tracing::debug!("cache miss");
                return None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "cache unavailable, falling back to upstream");
                return None;
            }
        };

        let record = match ForecastRecord::from_bytes(&bytes) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(error = %e, "cached entry does not decode, evicting");
                self.evict(key, &bytes).await;
                return None;
            }
        };

        if record.location_key != key.as_str() {
            tracing::warn!(
                cached = %record.location_key,
                "cached entry belongs to another location, evicting"
            );
            self.evict(key, &bytes).await;
            return None;
        }

        Some(record)
    }

    /// Drops `stale` unless someone has rewritten the key since it was read
    async fn evict(&self, key: &LocationKey, stale: &[u8]) {
        match self.cache.remove_if(key.as_str(), stale).await {
            Ok(true) => {}
            Ok(false) => tracing::debug!("cache entry changed before eviction, kept"),
            Err(e) => tracing::warn!(error = %e, "failed to evict cache entry"),
        }
    }

    async fn fetch(&self, key: &LocationKey) -> Result<ForecastRecord, ResolveError> {
        let body = self.fetcher.fetch(key).await?;

        UpstreamForecast::parse(&body)
            .map_err(|e| ResolveError::UpstreamBadResponse(e.to_string()))
    }

    /// Stores under the record's own key, which upstream may have normalized
    async fn write_back(&self, record: &ForecastRecord) {
        let bytes = match record.to_bytes() {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize forecast for caching");
                return;
            }
        };

        match self
            .cache
            .set(&record.location_key, &bytes, CACHE_TTL)
            .await
        {
            Ok(()) => tracing::debug!(stored_as = %record.location_key, "forecast cached"),
            Err(e) => tracing::warn!(error = %e, "failed to write forecast back to cache"),
        }
    }
}
