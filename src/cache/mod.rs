//! Read-through cache over Redis.
//!
//! The client is constructed once at startup and injected into the services;
//! nothing holds a module-level connection. All writes carry a TTL so stale
//! entries age out even if invalidation never happens.

use anyhow::{Context, Result};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use tracing::info;

#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str, ttl_seconds: Option<u64>) -> Result<()>;
    /// Drops every key. Only test setups call this.
    async fn flush_all(&self) -> Result<()>;
}

pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    pub async fn connect(url: &str) -> Result<Self> {
        let client = Client::open(url).context("Failed to create Redis client")?;
        let conn = ConnectionManager::new(client)
            .await
            .context("Failed to connect to Redis")?;
        info!("Connected to cache at {}", url);
        Ok(Self { conn })
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl_seconds: Option<u64>) -> Result<()> {
        let mut conn = self.conn.clone();
        match ttl_seconds {
            Some(ttl) => conn.set_ex::<_, _, ()>(key, value, ttl).await?,
            None => conn.set::<_, _, ()>(key, value).await?,
        }
        Ok(())
    }

    async fn flush_all(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        redis::cmd("FLUSHALL").query_async::<()>(&mut conn).await?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory cache for tests. TTLs are recorded but never enforced; the
    //! tests that care assert on the recorded value.

    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub struct MemoryCache {
        entries: Mutex<HashMap<String, (String, Option<u64>)>>,
    }

    impl MemoryCache {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn ttl_of(&self, key: &str) -> Option<u64> {
            self.entries.lock().unwrap().get(key).and_then(|(_, ttl)| *ttl)
        }
    }

    #[async_trait]
    impl CacheStore for MemoryCache {
        async fn get(&self, key: &str) -> Result<Option<String>> {
            Ok(self
                .entries
                .lock()
                .unwrap()
                .get(key)
                .map(|(value, _)| value.clone()))
        }

        async fn set(&self, key: &str, value: &str, ttl_seconds: Option<u64>) -> Result<()> {
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), (value.to_string(), ttl_seconds));
            Ok(())
        }

        async fn flush_all(&self) -> Result<()> {
            self.entries.lock().unwrap().clear();
            Ok(())
        }
    }
}
