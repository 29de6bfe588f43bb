use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use moka::{
    Expiry,
    future::Cache,
    ops::compute::{CompResult, Op},
};

use super::{CacheResult, CacheStore};

#[derive(Clone)]
struct Entry {
    bytes: Arc<[u8]>,
    ttl: Duration,
}

/// Every write restarts the entry's clock with its own ttl, reads leave it alone
struct EntryTtl;

impl Expiry<String, Entry> for EntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &Entry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-process store, bounded to `capacity` entries
#[derive(Clone)]
pub struct MemoryStore {
    inner: Cache<String, Entry>,
}

impl MemoryStore {
    pub fn new(capacity: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(capacity)
            .expire_after(EntryTtl)
            .build();

        Self { inner }
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        Ok(self.inner.get(key).await.map(|entry| entry.bytes.to_vec()))
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> CacheResult<()> {
        let entry = Entry {
            bytes: Arc::from(value),
            ttl,
        };
        self.inner.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn remove_if(&self, key: &str, expected: &[u8]) -> CacheResult<bool> {
        let result = self
            .inner
            .entry(key.to_string())
            .and_compute_with(|current| async move {
                match current {
                    Some(entry) if *entry.value().bytes == *expected => Op::Remove,
                    _ => Op::Nop,
                }
            })
            .await;

        Ok(matches!(result, CompResult::Removed(_)))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
