use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Pending,
    Active,
    Completed,
    Archived,
}

impl RoomStatus {
    // ---
    pub fn as_str(&self) -> &'static str {
        // ---
        match self {
            RoomStatus::Pending => "pending",
            RoomStatus::Active => "active",
            RoomStatus::Completed => "completed",
            RoomStatus::Archived => "archived",
        }
    }
}

impl std::fmt::Display for RoomStatus {
    // ---
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // ---
        f.write_str(self.as_str())
    }
}

/// How daily submissions are scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringType {
    /// Completion is worth a flat single point.
    Binary,
    /// Submissions carry an explicit point or quantity value.
    Points,
}

/// Policy for picking a new admin when the current one leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminTransferRule {
    Manual,
    Activity,
    Voting,
}

impl Default for AdminTransferRule {
    // ---
    fn default() -> Self {
        AdminTransferRule::Manual
    }
}

/// A time-boxed group challenge, keyed by its six-character join code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    // ---
    pub code: String,
    pub name: String,
    pub description: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,

    /// Usernames in join order; the creator is always first.
    pub participants: Vec<String>,
    pub max_participants: u32,

    pub has_admin: bool,
    pub current_admin: Option<String>,
    pub is_public: bool,
    pub admin_transfer_rules: AdminTransferRule,

    pub challenge_type: String,
    /// Challenge length in days.
    pub duration: u32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,

    pub scoring_type: ScoringType,
    pub daily_target: i64,
    pub require_proof: bool,
    pub allow_late_submissions: bool,
    pub penalize_late_submissions: bool,

    pub status: RoomStatus,

    /// Denormalized analytics, recomputed after every submission.
    pub total_submissions: u64,
    pub average_completion_rate: f64,
    pub last_activity: DateTime<Utc>,
}

/// Input for room creation; the join code is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewRoom {
    // ---
    pub name: String,
    pub description: String,
    pub created_by: String,
    pub max_participants: u32,
    pub has_admin: bool,
    pub is_public: bool,
    pub admin_transfer_rules: AdminTransferRule,
    pub challenge_type: String,
    pub duration: u32,
    pub scoring_type: ScoringType,
    pub daily_target: i64,
    pub require_proof: bool,
    pub allow_late_submissions: bool,
    pub penalize_late_submissions: bool,
}

impl Room {
    // ---
    /// Build a fresh room from creation input.
    ///
    /// Public rooms are always administered; such a room (or any room
    /// created with `has_admin`) starts with the creator as admin.
    pub fn new(data: NewRoom, code: String) -> Self {
        // ---
        let now = Utc::now();
        let has_admin = data.is_public || data.has_admin;
        let current_admin = has_admin.then(|| data.created_by.clone());

        Self {
            code,
            name: data.name,
            description: data.description,
            participants: vec![data.created_by.clone()],
            created_by: data.created_by,
            created_at: now,
            max_participants: data.max_participants,
            has_admin,
            current_admin,
            is_public: data.is_public,
            admin_transfer_rules: data.admin_transfer_rules,
            challenge_type: data.challenge_type,
            duration: data.duration,
            start_date: now,
            end_date: now + Duration::days(i64::from(data.duration)),
            scoring_type: data.scoring_type,
            daily_target: data.daily_target,
            require_proof: data.require_proof,
            allow_late_submissions: data.allow_late_submissions,
            penalize_late_submissions: data.penalize_late_submissions,
            status: RoomStatus::Active,
            total_submissions: 0,
            average_completion_rate: 0.0,
            last_activity: now,
        }
    }

    pub fn is_participant(&self, username: &str) -> bool {
        // ---
        self.participants.iter().any(|p| p == username)
    }
}

/// Partial update applied to a stored [`Room`].
///
/// `current_admin` is doubly optional so a single type can express all
/// three outcomes: leave unchanged, assign a new admin, or clear it.
#[derive(Debug, Clone, Default)]
pub struct RoomUpdate {
    // ---
    pub participants: Option<Vec<String>>,
    pub current_admin: Option<Option<String>>,
    pub status: Option<RoomStatus>,
    pub total_submissions: Option<u64>,
    pub average_completion_rate: Option<f64>,
}

impl RoomUpdate {
    // ---
    pub fn apply(self, room: &mut Room) {
        // ---
        if let Some(participants) = self.participants {
            room.participants = participants;
        }
        if let Some(admin) = self.current_admin {
            room.current_admin = admin;
        }
        if let Some(status) = self.status {
            room.status = status;
        }
        if let Some(total) = self.total_submissions {
            room.total_submissions = total;
        }
        if let Some(rate) = self.average_completion_rate {
            room.average_completion_rate = rate;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_room() -> NewRoom {
        // ---
        NewRoom {
            name: "Pushups".into(),
            description: "30 a day".into(),
            created_by: "alice".into(),
            max_participants: 10,
            has_admin: false,
            is_public: false,
            admin_transfer_rules: AdminTransferRule::default(),
            challenge_type: "fitness".into(),
            duration: 30,
            scoring_type: ScoringType::Binary,
            daily_target: 1,
            require_proof: false,
            allow_late_submissions: false,
            penalize_late_submissions: false,
        }
    }

    #[test]
    fn public_room_always_gets_an_admin() {
        // ---
        let room = Room::new(
            NewRoom {
                is_public: true,
                has_admin: false,
                ..base_room()
            },
            "ABC123".into(),
        );

        assert!(room.has_admin);
        assert_eq!(room.current_admin.as_deref(), Some("alice"));
    }

    #[test]
    fn private_room_without_admin_has_none() {
        // ---
        let room = Room::new(base_room(), "ABC123".into());

        assert!(!room.has_admin);
        assert_eq!(room.current_admin, None);
        assert_eq!(room.status, RoomStatus::Active);
        assert_eq!(room.participants, vec!["alice".to_string()]);
    }

    #[test]
    fn end_date_is_start_plus_duration() {
        // ---
        let room = Room::new(base_room(), "ABC123".into());
        assert_eq!(room.end_date - room.start_date, Duration::days(30));
    }

    #[test]
    fn update_can_clear_the_admin() {
        // ---
        let mut room = Room::new(
            NewRoom {
                has_admin: true,
                ..base_room()
            },
            "ABC123".into(),
        );
        assert_eq!(room.current_admin.as_deref(), Some("alice"));

        RoomUpdate {
            current_admin: Some(None),
            status: Some(RoomStatus::Archived),
            ..Default::default()
        }
        .apply(&mut room);

        assert_eq!(room.current_admin, None);
        assert_eq!(room.status, RoomStatus::Archived);
    }

    #[test]
    fn serializes_with_camel_case_wire_names() {
        // ---
        let room = Room::new(base_room(), "ABC123".into());
        let json = serde_json::to_string(&room).unwrap();

        assert!(json.contains("\"createdBy\":\"alice\""));
        assert!(json.contains("\"scoringType\":\"binary\""));
        assert!(json.contains("\"adminTransferRules\":\"manual\""));
        assert!(json.contains("\"status\":\"active\""));
    }
}
