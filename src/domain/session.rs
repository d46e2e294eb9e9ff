use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A server-side login session.
///
/// `session_id` doubles as the storage key and is the value handed to the
/// client in the session cookie. Expiry is lazy: expired records are
/// treated as absent on read rather than reaped eagerly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    // ---
    pub session_id: String,
    pub username: String,
    pub device_info: String,
    pub created_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    // ---
    pub fn new(username: String, device_info: String, ttl: Duration) -> Self {
        // ---
        let now = Utc::now();
        Self {
            session_id: format!("session:{}", Uuid::new_v4()),
            username,
            device_info,
            created_at: now,
            last_accessed: now,
            expires_at: now + ttl,
        }
    }

    pub fn is_expired(&self) -> bool {
        // ---
        Utc::now() > self.expires_at
    }

    /// Refresh the last-accessed stamp; called on every successful lookup.
    pub fn touch(&mut self) {
        // ---
        self.last_accessed = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_session_is_not_expired() {
        // ---
        let session = Session::new("alice".into(), "test".into(), Duration::days(30));
        assert!(!session.is_expired());
        assert!(session.session_id.starts_with("session:"));
        assert_eq!(session.expires_at - session.created_at, Duration::days(30));
    }

    #[test]
    fn zero_ttl_session_expires_immediately() {
        // ---
        let session = Session::new("alice".into(), "test".into(), Duration::milliseconds(-1));
        assert!(session.is_expired());
    }

    #[test]
    fn ids_are_unique() {
        // ---
        let a = Session::new("alice".into(), "test".into(), Duration::days(1));
        let b = Session::new("alice".into(), "test".into(), Duration::days(1));
        assert_ne!(a.session_id, b.session_id);
    }
}
