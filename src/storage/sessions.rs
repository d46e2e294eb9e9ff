use chrono::Duration;

use super::{get_json, keys, set_json};
use crate::domain::{DomainResult, KvPtr, Session};

/// Login sessions plus the per-user session index.
///
/// Expiry is lazy: an expired record is reaped the first time something
/// reads it back, not by a background sweep.
pub struct SessionStore {
    // ---
    kv: KvPtr,
}

impl SessionStore {
    // ---
    pub(crate) fn new(kv: KvPtr) -> Self {
        // ---
        Self { kv }
    }

    pub async fn create(
        &self,
        username: &str,
        device_info: &str,
        ttl: Duration,
    ) -> DomainResult<Session> {
        // ---
        let session = Session::new(username.to_string(), device_info.to_string(), ttl);
        set_json(&self.kv, &session.session_id, &session).await?;
        self.kv
            .sadd(&keys::user_sessions(username), &session.session_id)
            .await?;
        Ok(session)
    }

    /// Look up a live session, refreshing its last-accessed stamp.
    /// Expired sessions are deleted and reported as absent.
    pub async fn get(&self, session_id: &str) -> DomainResult<Option<Session>> {
        // ---
        let Some(mut session) = get_json::<Session>(&self.kv, session_id).await? else {
            return Ok(None);
        };

        if session.is_expired() {
            self.delete(session_id).await?;
            return Ok(None);
        }

        session.touch();
        set_json(&self.kv, session_id, &session).await?;
        Ok(Some(session))
    }

    pub async fn delete(&self, session_id: &str) -> DomainResult<()> {
        // ---
        if let Some(session) = get_json::<Session>(&self.kv, session_id).await? {
            self.kv
                .srem(&keys::user_sessions(&session.username), session_id)
                .await?;
        }
        self.kv.del(session_id).await?;
        Ok(())
    }

    /// Drop every session a user holds, e.g. on a forced logout.
    pub async fn delete_all_for(&self, username: &str) -> DomainResult<()> {
        // ---
        let ids = self.kv.smembers(&keys::user_sessions(username)).await?;
        for id in &ids {
            self.kv.del(id).await?;
        }
        self.kv.del(&keys::user_sessions(username)).await?;
        Ok(())
    }
}
