use super::{get_json, keys, set_json};
use crate::auth;
use crate::domain::{DomainError, DomainResult, KvPtr, NewUser, User, UserUpdate};

/// Account records plus the global username index.
pub struct UserStore {
    // ---
    kv: KvPtr,
}

impl UserStore {
    // ---
    pub(crate) fn new(kv: KvPtr) -> Self {
        // ---
        Self { kv }
    }

    /// Create an account, hashing the password before it is persisted.
    ///
    /// Fails with `Conflict` when the username is already registered.
    pub async fn create(&self, data: NewUser) -> DomainResult<User> {
        // ---
        if self.get(&data.username).await?.is_some() {
            return Err(DomainError::Conflict("Username already exists".into()));
        }

        let hash = auth::hash_password(&data.password)?;
        let user = User::new(data.username, hash, data.email);

        set_json(&self.kv, &keys::user(&user.username), &user).await?;
        self.kv.sadd(keys::USERS, &user.username).await?;
        Ok(user)
    }

    pub async fn get(&self, username: &str) -> DomainResult<Option<User>> {
        // ---
        get_json(&self.kv, &keys::user(username)).await
    }

    /// Read-modify-write merge of the populated update fields.
    pub async fn update(&self, username: &str, update: UserUpdate) -> DomainResult<User> {
        // ---
        let mut user = self
            .get(username)
            .await?
            .ok_or_else(|| DomainError::NotFound("User not found".into()))?;

        update.apply(&mut user);
        set_json(&self.kv, &keys::user(username), &user).await?;
        Ok(user)
    }
}
