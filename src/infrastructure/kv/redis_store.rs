use anyhow::Result;
use redis::{AsyncCommands, Client};
use std::sync::Arc;

use crate::domain::{KvPtr, KvStore};

/// Creates the Redis-backed key-value store.
///
/// The URL is validated eagerly; actual connections are multiplexed and
/// established lazily per call.
pub fn create_redis_store(url: &str) -> Result<KvPtr> {
    // ---
    let client = Client::open(url)?;
    Ok(Arc::new(RedisKvStore::new(client)))
}

pub struct RedisKvStore {
    // ---
    client: Client,
}

impl RedisKvStore {
    // ---
    pub fn new(client: Client) -> Self {
        // ---
        Self { client }
    }

    async fn conn(&self) -> Result<redis::aio::MultiplexedConnection> {
        // ---
        Ok(self.client.get_multiplexed_async_connection().await?)
    }
}

#[async_trait::async_trait]
impl KvStore for RedisKvStore {
    // ---
    async fn get(&self, key: &str) -> Result<Option<String>> {
        // ---
        let mut conn = self.conn().await?;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        // ---
        let mut conn = self.conn().await?;
        let _: () = conn.set(key, value).await?;
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<()> {
        // ---
        let mut conn = self.conn().await?;
        let _: () = conn.del(key).await?;
        Ok(())
    }

    async fn sadd(&self, key: &str, member: &str) -> Result<()> {
        // ---
        let mut conn = self.conn().await?;
        let _: () = conn.sadd(key, member).await?;
        Ok(())
    }

    async fn srem(&self, key: &str, member: &str) -> Result<()> {
        // ---
        let mut conn = self.conn().await?;
        let _: () = conn.srem(key, member).await?;
        Ok(())
    }

    async fn smembers(&self, key: &str) -> Result<Vec<String>> {
        // ---
        let mut conn = self.conn().await?;
        let members: Vec<String> = conn.smembers(key).await?;
        Ok(members)
    }
}
