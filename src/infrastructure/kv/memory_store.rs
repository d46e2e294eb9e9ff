use anyhow::Result;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::domain::{KvPtr, KvStore};

/// Creates the in-memory key-value store.
///
/// Drop-in stand-in for the Redis backend with the same observable
/// contract; state lives for the life of the process. Used by the test
/// suites and by local development without a Redis instance.
pub fn create_memory_store() -> KvPtr {
    // ---
    Arc::new(MemoryKvStore::default())
}

#[derive(Default)]
pub struct MemoryKvStore {
    // ---
    values: Mutex<HashMap<String, String>>,
    sets: Mutex<HashMap<String, BTreeSet<String>>>,
}

impl MemoryKvStore {
    // ---
    fn values(&self) -> MutexGuard<'_, HashMap<String, String>> {
        // ---
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn sets(&self) -> MutexGuard<'_, HashMap<String, BTreeSet<String>>> {
        // ---
        self.sets.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait::async_trait]
impl KvStore for MemoryKvStore {
    // ---
    async fn get(&self, key: &str) -> Result<Option<String>> {
        // ---
        Ok(self.values().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        // ---
        self.values().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<()> {
        // ---
        self.values().remove(key);
        self.sets().remove(key);
        Ok(())
    }

    async fn sadd(&self, key: &str, member: &str) -> Result<()> {
        // ---
        self.sets()
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string());
        Ok(())
    }

    async fn srem(&self, key: &str, member: &str) -> Result<()> {
        // ---
        if let Some(set) = self.sets().get_mut(key) {
            set.remove(member);
        }
        Ok(())
    }

    async fn smembers(&self, key: &str) -> Result<Vec<String>> {
        // ---
        Ok(self
            .sets()
            .get(key)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_set_del_round_trip() {
        // ---
        let store = MemoryKvStore::default();

        assert_eq!(store.get("k").await.unwrap(), None);
        store.set("k", "v1").await.unwrap();
        store.set("k", "v2").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v2".into()));

        store.del("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
        // deleting again is fine
        store.del("k").await.unwrap();
    }

    #[tokio::test]
    async fn set_membership_deduplicates() {
        // ---
        let store = MemoryKvStore::default();

        store.sadd("s", "a").await.unwrap();
        store.sadd("s", "a").await.unwrap();
        store.sadd("s", "b").await.unwrap();
        assert_eq!(store.smembers("s").await.unwrap().len(), 2);

        store.srem("s", "a").await.unwrap();
        assert_eq!(store.smembers("s").await.unwrap(), vec!["b".to_string()]);

        // removing from an absent set is fine
        store.srem("missing", "a").await.unwrap();
        assert!(store.smembers("missing").await.unwrap().is_empty());
    }
}
