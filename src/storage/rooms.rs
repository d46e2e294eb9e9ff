use chrono::Utc;
use rand::Rng;
use serde::Serialize;

use super::{get_json, keys, set_json, ProgressStore, UserStore};
use crate::domain::{
    AdminTransferRule, DomainError, DomainResult, KvPtr, NewRoom, Progress, Room, RoomStatus,
    RoomUpdate, UserUpdate,
};

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const CODE_LENGTH: usize = 6;
const CODE_ATTEMPTS: u32 = 10;

/// Outcome of one room in a status-repair sweep.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRepair {
    // ---
    pub code: String,
    pub status: RoomStatus,
    pub fixed: bool,
}

/// Room records, membership indexes, and admin succession.
pub struct RoomStore {
    // ---
    kv: KvPtr,
}

impl RoomStore {
    // ---
    pub(crate) fn new(kv: KvPtr) -> Self {
        // ---
        Self { kv }
    }

    fn users(&self) -> UserStore {
        // ---
        UserStore::new(self.kv.clone())
    }

    fn progress(&self) -> ProgressStore {
        // ---
        ProgressStore::new(self.kv.clone())
    }

    fn generate_code() -> String {
        // ---
        let mut rng = rand::thread_rng();
        (0..CODE_LENGTH)
            .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
            .collect()
    }

    /// Create a room under a fresh join code, seeding every index with the
    /// creator. Gives up after a bounded number of code-collision retries.
    pub async fn create(&self, data: NewRoom) -> DomainResult<Room> {
        // ---
        let mut code = None;
        for _ in 0..CODE_ATTEMPTS {
            let candidate = Self::generate_code();
            if self.get(&candidate).await?.is_none() {
                code = Some(candidate);
                break;
            }
        }
        let code = code.ok_or(DomainError::CodeGenerationExhausted)?;

        let room = Room::new(data, code.clone());
        set_json(&self.kv, &keys::room(&code), &room).await?;
        self.kv.sadd(keys::ROOMS, &code).await?;
        self.kv
            .sadd(&keys::room_participants(&code), &room.created_by)
            .await?;
        self.kv
            .sadd(&keys::user_rooms(&room.created_by), &code)
            .await?;
        self.track_membership(&room.created_by, &code, true).await?;
        Ok(room)
    }

    pub async fn get(&self, code: &str) -> DomainResult<Option<Room>> {
        // ---
        get_json(&self.kv, &keys::room(code)).await
    }

    /// Read-modify-write merge; every write also refreshes `last_activity`.
    pub async fn update(&self, code: &str, update: RoomUpdate) -> DomainResult<Room> {
        // ---
        let mut room = self
            .get(code)
            .await?
            .ok_or_else(|| DomainError::NotFound("Room not found".into()))?;

        update.apply(&mut room);
        room.last_activity = Utc::now();
        set_json(&self.kv, &keys::room(code), &room).await?;
        Ok(room)
    }

    /// Add `username` to the room, rejecting repeat joins before capacity
    /// so a member of a full room still gets the membership answer.
    pub async fn add_participant(&self, code: &str, username: &str) -> DomainResult<Room> {
        // ---
        let room = self
            .get(code)
            .await?
            .ok_or_else(|| DomainError::NotFound("Room not found".into()))?;

        if room.is_participant(username) {
            return Err(DomainError::Conflict(
                "You are already a member of this room".into(),
            ));
        }
        if room.participants.len() as u32 >= room.max_participants {
            return Err(DomainError::CapacityExceeded("Room is full".into()));
        }

        let mut participants = room.participants;
        participants.push(username.to_string());

        self.kv
            .sadd(&keys::room_participants(code), username)
            .await?;
        let room = self
            .update(
                code,
                RoomUpdate {
                    participants: Some(participants),
                    ..Default::default()
                },
            )
            .await?;
        self.kv.sadd(&keys::user_rooms(username), code).await?;
        self.track_membership(username, code, true).await?;
        Ok(room)
    }

    /// Remove `username` from the room. Removing an absent member is a
    /// no-op; emptying the room archives it, and removing the current
    /// admin triggers succession.
    pub async fn remove_participant(&self, code: &str, username: &str) -> DomainResult<Room> {
        // ---
        let room = self
            .get(code)
            .await?
            .ok_or_else(|| DomainError::NotFound("Room not found".into()))?;

        let was_admin = room.has_admin && room.current_admin.as_deref() == Some(username);
        let mut participants = room.participants;
        participants.retain(|p| p != username);

        let mut room = self
            .update(
                code,
                RoomUpdate {
                    participants: Some(participants),
                    ..Default::default()
                },
            )
            .await?;
        self.kv
            .srem(&keys::room_participants(code), username)
            .await?;
        self.kv.srem(&keys::user_rooms(username), code).await?;
        self.track_membership(username, code, false).await?;

        if room.participants.is_empty() {
            room = self.archive(code).await?;
        } else if was_admin {
            room = self.transfer_admin(&room).await?;
        }
        Ok(room)
    }

    /// Delete the room along with its progress records and every index
    /// entry pointing at it.
    pub async fn delete(&self, code: &str) -> DomainResult<()> {
        // ---
        let Some(room) = self.get(code).await? else {
            return Ok(());
        };

        let progress_ids = self.kv.smembers(&keys::room_progress(code)).await?;
        for id in &progress_ids {
            match get_json::<Progress>(&self.kv, id).await {
                Ok(Some(record)) => {
                    self.kv
                        .srem(&keys::user_progress(&record.username), id)
                        .await?;
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!("Dropping unreadable progress record {id}: {e}");
                }
            }
            self.kv.del(id).await?;
        }
        self.kv.del(&keys::room_progress(code)).await?;

        for participant in &room.participants {
            self.kv.srem(&keys::user_rooms(participant), code).await?;
            self.track_membership(participant, code, false).await?;
        }
        self.kv.del(&keys::room_participants(code)).await?;

        self.kv.del(&keys::room(code)).await?;
        self.kv.srem(keys::ROOMS, code).await?;
        Ok(())
    }

    /// Public rooms open for joining, newest first.
    pub async fn public_rooms(&self) -> DomainResult<Vec<Room>> {
        // ---
        let codes = self.kv.smembers(keys::ROOMS).await?;
        let mut rooms = Vec::new();
        for code in codes {
            if let Some(room) = self.get(&code).await? {
                if room.is_public && room.status == RoomStatus::Active {
                    rooms.push(room);
                }
            }
        }
        rooms.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rooms)
    }

    /// Active rooms `username` belongs to, most recently active first.
    pub async fn active_rooms_for(&self, username: &str) -> DomainResult<Vec<Room>> {
        // ---
        let codes = self.kv.smembers(&keys::user_rooms(username)).await?;
        let mut rooms = Vec::new();
        for code in codes {
            if let Some(room) = self.get(&code).await? {
                if room.status == RoomStatus::Active {
                    rooms.push(room);
                }
            }
        }
        rooms.sort_by(|a, b| b.last_activity.cmp(&a.last_activity));
        Ok(rooms)
    }

    /// Sweep every room and promote stragglers stuck in `pending`.
    pub async fn repair_statuses(&self) -> DomainResult<Vec<StatusRepair>> {
        // ---
        let codes = self.kv.smembers(keys::ROOMS).await?;
        let mut report = Vec::new();
        for code in codes {
            let Some(room) = self.get(&code).await? else {
                continue;
            };
            if room.status == RoomStatus::Pending {
                let repaired = self
                    .update(
                        &code,
                        RoomUpdate {
                            status: Some(RoomStatus::Active),
                            ..Default::default()
                        },
                    )
                    .await?;
                report.push(StatusRepair {
                    code,
                    status: repaired.status,
                    fixed: true,
                });
            } else {
                report.push(StatusRepair {
                    code,
                    status: room.status,
                    fixed: false,
                });
            }
        }
        Ok(report)
    }

    /// Archive an emptied room and clear its admin seat.
    async fn archive(&self, code: &str) -> DomainResult<Room> {
        // ---
        self.update(
            code,
            RoomUpdate {
                status: Some(RoomStatus::Archived),
                current_admin: Some(None),
                ..Default::default()
            },
        )
        .await
    }

    /// Hand the admin seat to a successor after the admin departs.
    ///
    /// `activity` picks the busiest remaining participant; `manual` and
    /// `voting` fall back to the earliest joiner still present.
    async fn transfer_admin(&self, room: &Room) -> DomainResult<Room> {
        // ---
        let successor = match room.admin_transfer_rules {
            AdminTransferRule::Activity => self.most_active_participant(room).await?,
            AdminTransferRule::Manual | AdminTransferRule::Voting => room.participants[0].clone(),
        };
        self.update(
            &room.code,
            RoomUpdate {
                current_admin: Some(Some(successor)),
                ..Default::default()
            },
        )
        .await
    }

    /// Participant with the most submissions; a tie keeps the earliest
    /// joiner since only a strictly larger count displaces the leader.
    async fn most_active_participant(&self, room: &Room) -> DomainResult<String> {
        // ---
        let progress = self.progress();
        let mut best = room.participants[0].clone();
        let mut best_count = progress.count_for_user(&room.code, &best).await?;
        for candidate in &room.participants[1..] {
            let count = progress.count_for_user(&room.code, candidate).await?;
            if count > best_count {
                best = candidate.clone();
                best_count = count;
            }
        }
        Ok(best)
    }

    /// Mirror membership changes into the user record's room list.
    async fn track_membership(&self, username: &str, code: &str, joined: bool) -> DomainResult<()> {
        // ---
        let users = self.users();
        let Some(user) = users.get(username).await? else {
            return Ok(());
        };

        let mut rooms = user.active_rooms;
        if joined {
            if !rooms.iter().any(|c| c == code) {
                rooms.push(code.to_string());
            }
        } else {
            rooms.retain(|c| c != code);
        }
        users
            .update(
                username,
                UserUpdate {
                    active_rooms: Some(rooms),
                    ..Default::default()
                },
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewProgress, NewUser, ScoringType};
    use crate::infrastructure::create_memory_store;
    use crate::storage::Database;

    async fn database_with_users(usernames: &[&str]) -> Database {
        // ---
        let db = Database::new(create_memory_store());
        for username in usernames {
            db.users()
                .create(NewUser {
                    username: username.to_string(),
                    password: "hunter22".into(),
                    email: None,
                })
                .await
                .unwrap();
        }
        db
    }

    fn sample_room(created_by: &str) -> NewRoom {
        // ---
        NewRoom {
            name: "Pushups".into(),
            description: "30 a day".into(),
            created_by: created_by.into(),
            max_participants: 3,
            has_admin: true,
            is_public: false,
            admin_transfer_rules: AdminTransferRule::Manual,
            challenge_type: "fitness".into(),
            duration: 30,
            scoring_type: ScoringType::Binary,
            daily_target: 1,
            require_proof: false,
            allow_late_submissions: false,
            penalize_late_submissions: false,
        }
    }

    fn submission(code: &str, username: &str, date: &str) -> NewProgress {
        // ---
        NewProgress {
            room_code: code.into(),
            username: username.into(),
            date: date.parse().unwrap(),
            completed: true,
            points: 1,
            quantity: None,
            notes: String::new(),
            proof_description: String::new(),
            is_late_submission: false,
        }
    }

    #[tokio::test]
    async fn create_assigns_code_and_seeds_indexes() {
        // ---
        let db = database_with_users(&["alice"]).await;
        let room = db.rooms().create(sample_room("alice")).await.unwrap();

        assert_eq!(room.code.len(), 6);
        assert!(room
            .code
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));

        let fetched = db.rooms().get(&room.code).await.unwrap().unwrap();
        assert_eq!(fetched.participants, vec!["alice".to_string()]);

        let alice = db.users().get("alice").await.unwrap().unwrap();
        assert_eq!(alice.active_rooms, vec![room.code.clone()]);

        let active = db.rooms().active_rooms_for("alice").await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].code, room.code);
    }

    #[tokio::test]
    async fn join_rejects_repeat_members_then_capacity() {
        // ---
        let db = database_with_users(&["alice", "bob", "carol", "dave"]).await;
        let room = db.rooms().create(sample_room("alice")).await.unwrap();

        db.rooms()
            .add_participant(&room.code, "bob")
            .await
            .unwrap();

        let err = db
            .rooms()
            .add_participant(&room.code, "bob")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        db.rooms()
            .add_participant(&room.code, "carol")
            .await
            .unwrap();

        // max_participants is 3 and the room now holds alice, bob, carol
        let err = db
            .rooms()
            .add_participant(&room.code, "dave")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::CapacityExceeded(_)));
    }

    #[tokio::test]
    async fn join_unknown_room_is_not_found() {
        // ---
        let db = database_with_users(&["alice"]).await;
        let err = db
            .rooms()
            .add_participant("ZZZZZZ", "alice")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn last_leaver_archives_the_room() {
        // ---
        let db = database_with_users(&["alice"]).await;
        let room = db.rooms().create(sample_room("alice")).await.unwrap();

        let room = db
            .rooms()
            .remove_participant(&room.code, "alice")
            .await
            .unwrap();

        assert_eq!(room.status, RoomStatus::Archived);
        assert_eq!(room.current_admin, None);
        assert!(room.participants.is_empty());

        let alice = db.users().get("alice").await.unwrap().unwrap();
        assert!(alice.active_rooms.is_empty());
    }

    #[tokio::test]
    async fn emptying_an_adminless_room_also_archives_it() {
        // ---
        let db = database_with_users(&["alice"]).await;
        let room = db
            .rooms()
            .create(NewRoom {
                has_admin: false,
                ..sample_room("alice")
            })
            .await
            .unwrap();
        assert_eq!(room.current_admin, None);

        let room = db
            .rooms()
            .remove_participant(&room.code, "alice")
            .await
            .unwrap();
        assert_eq!(room.status, RoomStatus::Archived);
    }

    #[tokio::test]
    async fn manual_rule_promotes_earliest_remaining_joiner() {
        // ---
        let db = database_with_users(&["alice", "bob", "carol"]).await;
        let room = db.rooms().create(sample_room("alice")).await.unwrap();
        db.rooms().add_participant(&room.code, "bob").await.unwrap();
        db.rooms()
            .add_participant(&room.code, "carol")
            .await
            .unwrap();

        let room = db
            .rooms()
            .remove_participant(&room.code, "alice")
            .await
            .unwrap();

        assert_eq!(room.current_admin.as_deref(), Some("bob"));
        assert_eq!(room.status, RoomStatus::Active);
    }

    #[tokio::test]
    async fn activity_rule_promotes_the_busiest_participant() {
        // ---
        let db = database_with_users(&["alice", "bob", "carol"]).await;
        let room = db
            .rooms()
            .create(NewRoom {
                admin_transfer_rules: AdminTransferRule::Activity,
                ..sample_room("alice")
            })
            .await
            .unwrap();
        db.rooms().add_participant(&room.code, "bob").await.unwrap();
        db.rooms()
            .add_participant(&room.code, "carol")
            .await
            .unwrap();

        // carol has two submissions to bob's one
        db.progress()
            .submit(submission(&room.code, "bob", "2026-08-20"))
            .await
            .unwrap();
        db.progress()
            .submit(submission(&room.code, "carol", "2026-08-20"))
            .await
            .unwrap();
        db.progress()
            .submit(submission(&room.code, "carol", "2026-08-21"))
            .await
            .unwrap();

        let room = db
            .rooms()
            .remove_participant(&room.code, "alice")
            .await
            .unwrap();
        assert_eq!(room.current_admin.as_deref(), Some("carol"));
    }

    #[tokio::test]
    async fn removing_non_admin_keeps_the_admin_seat() {
        // ---
        let db = database_with_users(&["alice", "bob"]).await;
        let room = db.rooms().create(sample_room("alice")).await.unwrap();
        db.rooms().add_participant(&room.code, "bob").await.unwrap();

        let room = db
            .rooms()
            .remove_participant(&room.code, "bob")
            .await
            .unwrap();
        assert_eq!(room.current_admin.as_deref(), Some("alice"));
        assert_eq!(room.participants, vec!["alice".to_string()]);
    }

    #[tokio::test]
    async fn delete_scrubs_progress_and_membership_indexes() {
        // ---
        let db = database_with_users(&["alice", "bob"]).await;
        let room = db.rooms().create(sample_room("alice")).await.unwrap();
        db.rooms().add_participant(&room.code, "bob").await.unwrap();

        let record = db
            .progress()
            .submit(submission(&room.code, "bob", "2026-08-20"))
            .await
            .unwrap();

        db.rooms().delete(&room.code).await.unwrap();

        assert!(db.rooms().get(&room.code).await.unwrap().is_none());
        assert!(db.progress().get(&record.id).await.unwrap().is_none());
        assert!(db
            .progress()
            .for_user(&room.code, "bob")
            .await
            .unwrap()
            .is_empty());

        let bob = db.users().get("bob").await.unwrap().unwrap();
        assert!(bob.active_rooms.is_empty());
        assert!(db.rooms().active_rooms_for("bob").await.unwrap().is_empty());
        assert!(db.rooms().public_rooms().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_of_unknown_room_is_a_no_op() {
        // ---
        let db = database_with_users(&[]).await;
        db.rooms().delete("ZZZZZZ").await.unwrap();
    }

    #[tokio::test]
    async fn public_listing_excludes_private_and_inactive_rooms() {
        // ---
        let db = database_with_users(&["alice"]).await;
        let public = db
            .rooms()
            .create(NewRoom {
                is_public: true,
                ..sample_room("alice")
            })
            .await
            .unwrap();
        let _private = db.rooms().create(sample_room("alice")).await.unwrap();
        let archived = db
            .rooms()
            .create(NewRoom {
                is_public: true,
                ..sample_room("alice")
            })
            .await
            .unwrap();
        db.rooms()
            .update(
                &archived.code,
                RoomUpdate {
                    status: Some(RoomStatus::Archived),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let listed = db.rooms().public_rooms().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].code, public.code);
    }

    #[tokio::test]
    async fn repair_promotes_pending_rooms_only() {
        // ---
        let db = database_with_users(&["alice"]).await;
        let stuck = db.rooms().create(sample_room("alice")).await.unwrap();
        let fine = db.rooms().create(sample_room("alice")).await.unwrap();
        db.rooms()
            .update(
                &stuck.code,
                RoomUpdate {
                    status: Some(RoomStatus::Pending),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let report = db.rooms().repair_statuses().await.unwrap();
        assert_eq!(report.len(), 2);

        let stuck_entry = report.iter().find(|r| r.code == stuck.code).unwrap();
        assert!(stuck_entry.fixed);
        assert_eq!(stuck_entry.status, RoomStatus::Active);

        let fine_entry = report.iter().find(|r| r.code == fine.code).unwrap();
        assert!(!fine_entry.fixed);

        let repaired = db.rooms().get(&stuck.code).await.unwrap().unwrap();
        assert_eq!(repaired.status, RoomStatus::Active);
    }

    /// A store where every key already holds a room, so every generated
    /// code collides.
    struct SaturatedStore;

    #[async_trait::async_trait]
    impl crate::domain::KvStore for SaturatedStore {
        async fn get(&self, _key: &str) -> anyhow::Result<Option<String>> {
            let room = Room::new(sample_room("alice"), "AAAAAA".into());
            Ok(Some(serde_json::to_string(&room)?))
        }
        async fn set(&self, _key: &str, _value: &str) -> anyhow::Result<()> {
            Ok(())
        }
        async fn del(&self, _key: &str) -> anyhow::Result<()> {
            Ok(())
        }
        async fn sadd(&self, _key: &str, _member: &str) -> anyhow::Result<()> {
            Ok(())
        }
        async fn srem(&self, _key: &str, _member: &str) -> anyhow::Result<()> {
            Ok(())
        }
        async fn smembers(&self, _key: &str) -> anyhow::Result<Vec<String>> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn code_generation_gives_up_after_bounded_collisions() {
        // ---
        let store = RoomStore::new(std::sync::Arc::new(SaturatedStore));
        let err = store.create(sample_room("alice")).await.unwrap_err();
        assert!(matches!(err, DomainError::CodeGenerationExhausted));
    }
}
