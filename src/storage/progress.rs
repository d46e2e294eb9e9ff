use super::{get_json, keys, set_json, RoomStore};
use crate::domain::{
    DomainError, DomainResult, KvPtr, NewProgress, Progress, ProgressUpdate, RoomUpdate,
};

/// Progress records plus the per-room and per-user submission indexes.
pub struct ProgressStore {
    // ---
    kv: KvPtr,
}

impl ProgressStore {
    // ---
    pub(crate) fn new(kv: KvPtr) -> Self {
        // ---
        Self { kv }
    }

    fn rooms(&self) -> RoomStore {
        // ---
        RoomStore::new(self.kv.clone())
    }

    /// Persist a fresh submission and refresh the room's analytics.
    ///
    /// The record id encodes (room, user, day), so a second submission for
    /// the same day is rejected here even if the caller's duplicate check
    /// raced another writer.
    pub async fn submit(&self, data: NewProgress) -> DomainResult<Progress> {
        // ---
        let id = Progress::record_id(&data.room_code, &data.username, data.date);
        if get_json::<Progress>(&self.kv, &id).await?.is_some() {
            return Err(DomainError::DuplicateSubmission);
        }

        let progress = Progress::new(data);
        set_json(&self.kv, &progress.id, &progress).await?;
        self.kv
            .sadd(&keys::room_progress(&progress.room_code), &progress.id)
            .await?;
        self.kv
            .sadd(&keys::user_progress(&progress.username), &progress.id)
            .await?;

        self.refresh_room_analytics(&progress.room_code).await?;
        Ok(progress)
    }

    pub async fn get(&self, id: &str) -> DomainResult<Option<Progress>> {
        // ---
        get_json(&self.kv, id).await
    }

    /// Every submission in a room, newest day first.
    pub async fn for_room(&self, code: &str) -> DomainResult<Vec<Progress>> {
        // ---
        let ids = self.kv.smembers(&keys::room_progress(code)).await?;
        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(record) = self.get(&id).await? {
                records.push(record);
            }
        }
        records.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(records)
    }

    /// One user's submissions in a room, newest day first.
    pub async fn for_user(&self, code: &str, username: &str) -> DomainResult<Vec<Progress>> {
        // ---
        let ids = self.kv.smembers(&keys::user_progress(username)).await?;
        let mut records = Vec::new();
        for id in ids {
            if let Some(record) = self.get(&id).await? {
                if record.room_code == code {
                    records.push(record);
                }
            }
        }
        records.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(records)
    }

    pub async fn count_for_user(&self, code: &str, username: &str) -> DomainResult<usize> {
        // ---
        Ok(self.for_user(code, username).await?.len())
    }

    /// Merge an edit into a stored record, appending to its edit history.
    pub async fn update(&self, id: &str, update: ProgressUpdate) -> DomainResult<Progress> {
        // ---
        let mut record = self
            .get(id)
            .await?
            .ok_or_else(|| DomainError::NotFound("Progress record not found".into()))?;

        update.apply(&mut record);
        set_json(&self.kv, id, &record).await?;
        Ok(record)
    }

    /// Recompute a room's denormalized submission stats from a full scan.
    /// A room deleted mid-flight is skipped rather than reported.
    async fn refresh_room_analytics(&self, code: &str) -> DomainResult<()> {
        // ---
        let records = self.for_room(code).await?;
        let total = records.len() as u64;
        let completed = records.iter().filter(|r| r.completed).count() as u64;
        let rate = if total == 0 {
            0.0
        } else {
            completed as f64 / total as f64 * 100.0
        };

        match self
            .rooms()
            .update(
                code,
                RoomUpdate {
                    total_submissions: Some(total),
                    average_completion_rate: Some(rate),
                    ..Default::default()
                },
            )
            .await
        {
            Ok(_) | Err(DomainError::NotFound(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }
}
