use anyhow::Result;
use std::sync::Arc;

/// Abstraction over the remote key-value service backing all persistence.
///
/// The surface is deliberately narrow: plain string values plus unordered
/// string sets. Everything richer (records, indexes, partial updates) is
/// built on top of these six calls in the storage layer.
#[async_trait::async_trait]
pub trait KvStore: Send + Sync {
    // ---
    /// Fetch the value stored at `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` at `key`, overwriting any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete `key`. Deleting an absent key is not an error.
    async fn del(&self, key: &str) -> Result<()>;

    /// Add `member` to the set at `key`, creating the set if needed.
    async fn sadd(&self, key: &str, member: &str) -> Result<()>;

    /// Remove `member` from the set at `key`. Absent members are ignored.
    async fn srem(&self, key: &str, member: &str) -> Result<()>;

    /// All members of the set at `key`; empty vec when the set is absent.
    async fn smembers(&self, key: &str) -> Result<Vec<String>>;
}

/// Type alias for any backend that implements KvStore.
pub type KvPtr = Arc<dyn KvStore>;
