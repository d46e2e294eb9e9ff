//! Typed record stores layered over the key-value backend.
//!
//! Each store owns one entity family (users, rooms, progress, sessions)
//! and serializes records as JSON strings under the keys in [`keys`].
//! Reads of missing keys come back as `None`; writes are last-write-wins
//! read-modify-write, which matches the backend's contract.

mod keys;
mod progress;
mod rooms;
mod sessions;
mod users;

pub use progress::ProgressStore;
pub use rooms::{RoomStore, StatusRepair};
pub use sessions::SessionStore;
pub use users::UserStore;

use crate::domain::{DomainResult, KvPtr};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Entry point to the storage layer; cheap to clone and hand out.
#[derive(Clone)]
pub struct Database {
    // ---
    kv: KvPtr,
}

impl Database {
    // ---
    pub fn new(kv: KvPtr) -> Self {
        // ---
        Self { kv }
    }

    pub fn users(&self) -> UserStore {
        // ---
        UserStore::new(self.kv.clone())
    }

    pub fn rooms(&self) -> RoomStore {
        // ---
        RoomStore::new(self.kv.clone())
    }

    pub fn progress(&self) -> ProgressStore {
        // ---
        ProgressStore::new(self.kv.clone())
    }

    pub fn sessions(&self) -> SessionStore {
        // ---
        SessionStore::new(self.kv.clone())
    }

    /// Round-trip a read against the backend; used by deep health checks.
    pub async fn ping(&self) -> anyhow::Result<()> {
        // ---
        self.kv.get("healthcheck").await.map(|_| ())
    }
}

/// Fetch and deserialize the record at `key`, if present.
pub(crate) async fn get_json<T: DeserializeOwned>(kv: &KvPtr, key: &str) -> DomainResult<Option<T>> {
    // ---
    match kv.get(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Serialize and store `value` at `key`.
pub(crate) async fn set_json<T: Serialize>(kv: &KvPtr, key: &str, value: &T) -> DomainResult<()> {
    // ---
    let raw = serde_json::to_string(value)?;
    kv.set(key, &raw).await?;
    Ok(())
}
