use std::{sync::Arc, time::Duration};

use anyhow::Context;
use async_trait::async_trait;
use redis::{AsyncCommands, RedisResult, aio::ConnectionManager};
use tokio::sync::OnceCell;

use super::{CacheError, CacheResult, CacheStore};

// DEL only while the key still holds ARGV[1]
const REMOVE_IF_SCRIPT: &str = r"
if redis.call('GET', KEYS[1]) == ARGV[1] then
    return redis.call('DEL', KEYS[1])
end
return 0
";

/// Redis-backed store, expiry is enforced by the server through `SET .. PX`
///
/// The connection is opened on first use. Until it succeeds every operation
/// fails with a [`CacheError`] and the next one tries again, once open the
/// connection manager reconnects by itself.
#[derive(Clone)]
pub struct RedisStore {
    client: redis::Client,
    conn: Arc<OnceCell<ConnectionManager>>,
    remove_if_script: redis::Script,
    op_timeout: Duration,
}

impl RedisStore {
    /// Fails only on a malformed url, the server is not contacted
    pub fn new(url: &str, op_timeout: Duration) -> anyhow::Result<Self> {
        let client = redis::Client::open(url).context("Invalid redis url")?;

        Ok(Self {
            client,
            conn: Arc::new(OnceCell::new()),
            remove_if_script: redis::Script::new(REMOVE_IF_SCRIPT),
            op_timeout,
        })
    }

    /// Opens the connection if needed and pings the server
    pub async fn check(&self) -> CacheResult<()> {
        let mut conn = self.connection().await?;
        self.bounded(async move {
            let _: () = redis::cmd("PING").query_async(&mut conn).await?;
            Ok(())
        })
        .await
    }

    async fn connection(&self) -> CacheResult<ConnectionManager> {
        let init = self
            .conn
            .get_or_try_init(|| ConnectionManager::new(self.client.clone()));

        let conn = self.bounded(init).await?;
        Ok(conn.clone())
    }

    async fn bounded<T, F>(&self, op: F) -> CacheResult<T>
    where
        F: Future<Output = RedisResult<T>>,
    {
        match tokio::time::timeout(self.op_timeout, op).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(CacheError::Unavailable(e.to_string())),
            Err(_) => Err(CacheError::Timeout(self.op_timeout)),
        }
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    #[tracing::instrument(name = "cache::redis::get", skip(self))]
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        let mut conn = self.connection().await?;
        self.bounded(async move {
            let value: Option<Vec<u8>> = conn.get(key).await?;
            Ok(value)
        })
        .await
    }

    #[tracing::instrument(name = "cache::redis::set", skip(self, value))]
    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> CacheResult<()> {
        let mut conn = self.connection().await?;
        // PX rejects 0, a sub-millisecond ttl still has to expire
        let ttl_ms = ttl.as_millis().clamp(1, u64::MAX as u128) as u64;

        self.bounded(async move {
            let _: () = redis::cmd("SET")
                .arg(key)
                .arg(value)
                .arg("PX")
                .arg(ttl_ms)
                .query_async(&mut conn)
                .await?;
            Ok(())
        })
        .await
    }

    #[tracing::instrument(name = "cache::redis::remove_if", skip(self, expected))]
    async fn remove_if(&self, key: &str, expected: &[u8]) -> CacheResult<bool> {
        let mut conn = self.connection().await?;
        self.bounded(async move {
            let removed: i64 = self
                .remove_if_script
                .key(key)
                .arg(expected)
                .invoke_async(&mut conn)
                .await?;
            Ok(removed > 0)
        })
        .await
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
