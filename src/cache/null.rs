use std::time::Duration;

use async_trait::async_trait;

use super::{CacheResult, CacheStore};

/// Store used when caching is disabled: every lookup misses, every write succeeds
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStore;

#[async_trait]
impl CacheStore for NullStore {
    async fn get(&self, _key: &str) -> CacheResult<Option<Vec<u8>>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: &[u8], _ttl: Duration) -> CacheResult<()> {
        Ok(())
    }

    async fn remove_if(&self, _key: &str, _expected: &[u8]) -> CacheResult<bool> {
        Ok(false)
    }

    fn name(&self) -> &'static str {
        "none"
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn always_misses() {
        let store = NullStore;

        assert!(store.set("Berlin", b"{}", Duration::from_secs(60)).await.is_ok());
        assert!(store.get("Berlin").await.unwrap().is_none());
        assert!(!store.remove_if("Berlin", b"{}").await.unwrap());
    }
}
