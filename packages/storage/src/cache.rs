// ABOUTME: Key-value cache used for session and refresh-token bookkeeping
// ABOUTME: In-memory and Redis implementations behind one async trait

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

use crate::StorageError;

/// String cache with per-key expiry
#[async_trait]
pub trait Cache: Send + Sync {
    /// Store `value` under `key` for `ttl`, replacing any previous value
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StorageError>;

    /// Fetch a live value, `None` when absent or expired
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}

struct CacheEntry {
    value: String,
    expires_at: Instant,
}

/// Process-local cache. Expired entries are dropped lazily on access.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StorageError> {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            CacheEntry {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if entry.expires_at > Instant::now() => {
                    return Ok(Some(entry.value.clone()))
                }
                Some(_) => {}
            }
        }

        // Expired
        let mut entries = self.entries.write().await;
        if entries
            .get(key)
            .is_some_and(|entry| entry.expires_at <= Instant::now())
        {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

/// Redis-backed cache sharing one auto-reconnecting connection
#[derive(Clone)]
pub struct RedisCache {
    connection: ConnectionManager,
}

impl RedisCache {
    pub async fn connect(redis_url: &str) -> Result<Self, StorageError> {
        debug!("Connecting to redis");
        let client = redis::Client::open(redis_url)?;
        let connection = ConnectionManager::new(client).await?;
        Ok(Self { connection })
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StorageError> {
        let mut connection = self.connection.clone();
        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);
        let _: () = connection.pset_ex(key, value, ttl_ms).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut connection = self.connection.clone();
        let value: Option<String> = connection.get(key).await?;
        Ok(value)
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let mut connection = self.connection.clone();
        let _: i64 = connection.del(key).await?;
        Ok(())
    }
}
