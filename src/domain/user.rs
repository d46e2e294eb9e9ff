use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered account, keyed by username.
///
/// The stored record carries the Argon2 password hash; anything returned
/// over the wire goes through [`UserView`] instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    // ---
    pub username: String,

    /// Argon2 hash in PHC string format, never the plaintext.
    pub password: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    pub join_date: DateTime<Utc>,
    pub last_login: DateTime<Utc>,

    /// Lifetime aggregates; only `last_login` is refreshed automatically.
    pub total_challenges: u32,
    pub completed_challenges: u32,
    pub total_streak: u32,
    pub longest_streak: u32,

    /// Codes of rooms this user currently belongs to.
    pub active_rooms: Vec<String>,

    pub settings: UserSettings,
}

/// Per-user notification preferences, replaced wholesale on profile update.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    // ---
    pub email_notifications: bool,
    pub reminder_time: String,
    pub timezone: String,
}

impl Default for UserSettings {
    // ---
    fn default() -> Self {
        // ---
        Self {
            email_notifications: true,
            reminder_time: "20:00".to_string(),
            timezone: "UTC".to_string(),
        }
    }
}

/// Input for account creation; the password arrives in plaintext and is
/// hashed before the record is persisted.
#[derive(Debug, Clone)]
pub struct NewUser {
    // ---
    pub username: String,
    pub password: String,
    pub email: Option<String>,
}

impl User {
    // ---
    pub fn new(username: String, password_hash: String, email: Option<String>) -> Self {
        // ---
        let now = Utc::now();
        Self {
            username,
            password: password_hash,
            email,
            join_date: now,
            last_login: now,
            total_challenges: 0,
            completed_challenges: 0,
            total_streak: 0,
            longest_streak: 0,
            active_rooms: Vec::new(),
            settings: UserSettings::default(),
        }
    }
}

/// Wire-safe projection of a [`User`] with the password hash omitted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    // ---
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub join_date: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
    pub total_challenges: u32,
    pub completed_challenges: u32,
    pub total_streak: u32,
    pub longest_streak: u32,
    pub active_rooms: Vec<String>,
    pub settings: UserSettings,
}

impl From<&User> for UserView {
    // ---
    fn from(user: &User) -> Self {
        // ---
        Self {
            username: user.username.clone(),
            email: user.email.clone(),
            join_date: user.join_date,
            last_login: user.last_login,
            total_challenges: user.total_challenges,
            completed_challenges: user.completed_challenges,
            total_streak: user.total_streak,
            longest_streak: user.longest_streak,
            active_rooms: user.active_rooms.clone(),
            settings: user.settings.clone(),
        }
    }
}

/// Partial update applied to a stored [`User`].
///
/// Each populated field overwrites the stored one; `settings` replaces the
/// whole nested struct rather than merging field by field.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    // ---
    pub email: Option<String>,
    pub last_login: Option<DateTime<Utc>>,
    pub total_challenges: Option<u32>,
    pub completed_challenges: Option<u32>,
    pub total_streak: Option<u32>,
    pub longest_streak: Option<u32>,
    pub active_rooms: Option<Vec<String>>,
    pub settings: Option<UserSettings>,
}

impl UserUpdate {
    // ---
    pub fn apply(self, user: &mut User) {
        // ---
        if let Some(email) = self.email {
            user.email = Some(email);
        }
        if let Some(last_login) = self.last_login {
            user.last_login = last_login;
        }
        if let Some(total) = self.total_challenges {
            user.total_challenges = total;
        }
        if let Some(completed) = self.completed_challenges {
            user.completed_challenges = completed;
        }
        if let Some(total_streak) = self.total_streak {
            user.total_streak = total_streak;
        }
        if let Some(longest) = self.longest_streak {
            user.longest_streak = longest;
        }
        if let Some(rooms) = self.active_rooms {
            user.active_rooms = rooms;
        }
        if let Some(settings) = self.settings {
            user.settings = settings;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_gets_default_settings_and_zeroed_counters() {
        // ---
        let user = User::new("alice".into(), "hash".into(), None);

        assert!(user.settings.email_notifications);
        assert_eq!(user.settings.reminder_time, "20:00");
        assert_eq!(user.settings.timezone, "UTC");
        assert_eq!(user.total_challenges, 0);
        assert_eq!(user.longest_streak, 0);
        assert!(user.active_rooms.is_empty());
    }

    #[test]
    fn update_overwrites_only_populated_fields() {
        // ---
        let mut user = User::new("alice".into(), "hash".into(), None);
        let joined = user.join_date;

        UserUpdate {
            email: Some("alice@example.com".into()),
            total_challenges: Some(3),
            ..Default::default()
        }
        .apply(&mut user);

        assert_eq!(user.email.as_deref(), Some("alice@example.com"));
        assert_eq!(user.total_challenges, 3);
        assert_eq!(user.join_date, joined);
        assert_eq!(user.completed_challenges, 0);
    }

    #[test]
    fn settings_update_replaces_the_whole_struct() {
        // ---
        let mut user = User::new("alice".into(), "hash".into(), None);

        UserUpdate {
            settings: Some(UserSettings {
                email_notifications: false,
                reminder_time: "07:30".into(),
                timezone: "America/New_York".into(),
            }),
            ..Default::default()
        }
        .apply(&mut user);

        assert!(!user.settings.email_notifications);
        assert_eq!(user.settings.reminder_time, "07:30");
        assert_eq!(user.settings.timezone, "America/New_York");
    }

    #[test]
    fn view_omits_password_hash() {
        // ---
        let user = User::new("alice".into(), "secret-hash".into(), None);
        let view = UserView::from(&user);

        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(json.contains("\"username\":\"alice\""));
        assert!(json.contains("totalChallenges"));
    }
}
