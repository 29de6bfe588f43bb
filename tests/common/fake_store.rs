use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use forecast_cache::cache::{CacheError, CacheResult, CacheStore};
use tokio::time::Instant;

/// In-memory store on the tokio clock, so tests can pause and advance time
#[derive(Default)]
pub struct FakeStore {
    entries: Mutex<HashMap<String, (Vec<u8>, Instant)>>,
    writes: Mutex<Vec<(String, Duration)>>,
    removals: Mutex<Vec<String>>,
    reads: Mutex<Vec<String>>,
    rewrite_after_read: Mutex<Option<(String, Vec<u8>)>>,
    unavailable: AtomicBool,
    fail_writes: AtomicBool,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Seeds an entry without going through `set`
    pub fn put_raw(&self, key: &str, bytes: &[u8], ttl: Duration) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (bytes.to_vec(), Instant::now() + ttl));
    }

    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.entries
            .lock()
            .unwrap()
            .get(key)
            .filter(|(_, expires_at)| Instant::now() < *expires_at)
            .map(|(bytes, _)| bytes.clone())
    }

    /// Replaces `key` right after the next read of it, as a concurrent writer would
    pub fn rewrite_after_read(&self, key: &str, bytes: &[u8]) {
        *self.rewrite_after_read.lock().unwrap() = Some((key.to_string(), bytes.to_vec()));
    }

    pub fn writes(&self) -> Vec<(String, Duration)> {
        self.writes.lock().unwrap().clone()
    }

    pub fn removals(&self) -> Vec<String> {
        self.removals.lock().unwrap().clone()
    }

    pub fn reads(&self) -> Vec<String> {
        self.reads.lock().unwrap().clone()
    }
}

#[async_trait]
impl CacheStore for FakeStore {
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        self.reads.lock().unwrap().push(key.to_string());
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable("connection refused".to_string()));
        }
        let value = self.raw(key);

        let rewrite = self
            .rewrite_after_read
            .lock()
            .unwrap()
            .take_if(|(k, _)| *k == key);
        if let Some((_, bytes)) = rewrite {
            self.put_raw(key, &bytes, Duration::from_secs(60 * 60));
        }

        Ok(value)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> CacheResult<()> {
        self.writes.lock().unwrap().push((key.to_string(), ttl));
        if self.unavailable.load(Ordering::SeqCst) || self.fail_writes.load(Ordering::SeqCst) {
            return Err(CacheError::Timeout(Duration::from_millis(500)));
        }
        self.put_raw(key, value, ttl);
        Ok(())
    }

    async fn remove_if(&self, key: &str, expected: &[u8]) -> CacheResult<bool> {
        self.removals.lock().unwrap().push(key.to_string());
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable("connection refused".to_string()));
        }

        let mut entries = self.entries.lock().unwrap();
        if entries.get(key).is_some_and(|(bytes, _)| bytes == expected) {
            entries.remove(key);
            return Ok(true);
        }
        Ok(false)
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}
