//! Cache Store Adapter
//!
//! Key-value storage of serialized forecasts with per-entry expiry. The
//! resolver only talks to [`CacheStore`], so the backend is chosen at startup:
//! - [`MemoryStore`] - in-process store, the default
//! - [`RedisStore`] - shared store for several service instances
//! - [`NullStore`] - caching disabled

mod memory;
mod null;
mod redis_cache;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use memory::MemoryStore;
pub use null::NullStore;
pub use redis_cache::RedisStore;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache store unavailable: {0}")]
    Unavailable(String),
    #[error("cache store did not answer within {0:?}")]
    Timeout(Duration),
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Exact-match key-value store with expiry
///
/// Implementations must return stored bytes verbatim and must report an
/// entry as absent once its ttl has elapsed, whether or not it still
/// occupies storage.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns `Ok(None)` when the key is absent or expired
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>>;

    /// Stores `value`, replacing any previous value, expiring `ttl` from now
    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> CacheResult<()>;

    /// Removes the entry only while it still holds `expected`
    ///
    /// Returns whether an entry was removed. A value written since `expected`
    /// was read is left in place.
    async fn remove_if(&self, key: &str, expected: &[u8]) -> CacheResult<bool>;

    fn name(&self) -> &'static str;
}
