use async_trait::async_trait;
use bb8::Pool;
use bb8_redis::RedisConnectionManager;
use chrono::{DateTime, Utc};

use super::CounterStore;
use crate::error::AppError;

pub type RedisPool = Pool<RedisConnectionManager>;

/// Counters kept in Redis, shared by every API node.
pub struct RedisCounterStore {
    pool: RedisPool,
}

impl RedisCounterStore {
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    pub async fn connect(url: &str) -> Result<Self, AppError> {
        let manager = RedisConnectionManager::new(url)?;
        let pool = Pool::builder().build(manager).await?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn increment_with_expiry(&self, key: &str, expires_at: DateTime<Utc>) -> Result<u64, AppError> {
        let mut conn = self.pool.get().await?;

        // The expiry is the same for every increment of a given key, so it is
        // safe to set it unconditionally inside the same transaction.
        let (count,): (u64,) = redis::pipe()
            .atomic()
            .cmd("INCR")
            .arg(key)
            .cmd("EXPIREAT")
            .arg(key)
            .arg(expires_at.timestamp())
            .ignore()
            .query_async(&mut *conn)
            .await?;

        Ok(count)
    }

    async fn read(&self, key: &str) -> Result<u64, AppError> {
        let mut conn = self.pool.get().await?;
        let count: Option<u64> = redis::cmd("GET").arg(key).query_async(&mut *conn).await?;
        Ok(count.unwrap_or(0))
    }
}
