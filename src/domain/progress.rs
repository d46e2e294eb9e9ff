use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One participant's submission for one calendar day in one room.
///
/// The record id doubles as the storage key and encodes the composite
/// identity, so a second submission for the same day maps to the same id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    // ---
    pub id: String,
    pub room_code: String,
    pub username: String,

    /// Calendar day the submission is for, not the day it arrived.
    pub date: NaiveDate,

    pub completed: bool,
    pub points: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    pub notes: String,
    pub proof_description: String,

    pub submission_time: DateTime<Utc>,
    pub is_late_submission: bool,

    /// One entry per edit, oldest first, holding the replaced values.
    pub edit_history: Vec<ProgressEdit>,
}

/// A single edit to a progress record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEdit {
    // ---
    pub timestamp: DateTime<Utc>,
    /// Values the touched fields held before this edit.
    pub changes: ProgressChanges,
}

/// Sparse snapshot of progress fields; only touched fields are present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressChanges {
    // ---
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof_description: Option<String>,
}

/// Input for a fresh submission; points are computed by the caller from
/// the room's scoring rules before this is persisted.
#[derive(Debug, Clone)]
pub struct NewProgress {
    // ---
    pub room_code: String,
    pub username: String,
    pub date: NaiveDate,
    pub completed: bool,
    pub points: i64,
    pub quantity: Option<i64>,
    pub notes: String,
    pub proof_description: String,
    pub is_late_submission: bool,
}

impl Progress {
    // ---
    /// Storage key for the (room, user, day) composite identity.
    pub fn record_id(room_code: &str, username: &str, date: NaiveDate) -> String {
        // ---
        format!("progress:{room_code}:{username}:{date}")
    }

    pub fn new(data: NewProgress) -> Self {
        // ---
        Self {
            id: Self::record_id(&data.room_code, &data.username, data.date),
            room_code: data.room_code,
            username: data.username,
            date: data.date,
            completed: data.completed,
            points: data.points,
            quantity: data.quantity,
            notes: data.notes,
            proof_description: data.proof_description,
            submission_time: Utc::now(),
            is_late_submission: data.is_late_submission,
            edit_history: Vec::new(),
        }
    }
}

/// Partial update applied to a stored [`Progress`] record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    // ---
    pub completed: Option<bool>,
    pub points: Option<i64>,
    pub quantity: Option<i64>,
    pub notes: Option<String>,
    pub proof_description: Option<String>,
}

impl ProgressUpdate {
    // ---
    pub fn is_empty(&self) -> bool {
        // ---
        self.completed.is_none()
            && self.points.is_none()
            && self.quantity.is_none()
            && self.notes.is_none()
            && self.proof_description.is_none()
    }

    /// Overwrite the touched fields, first appending an edit-history entry
    /// that preserves the values being replaced.
    pub fn apply(self, progress: &mut Progress) {
        // ---
        if self.is_empty() {
            return;
        }

        let mut prior = ProgressChanges::default();
        if self.completed.is_some() {
            prior.completed = Some(progress.completed);
        }
        if self.points.is_some() {
            prior.points = Some(progress.points);
        }
        if self.quantity.is_some() {
            prior.quantity = progress.quantity;
        }
        if self.notes.is_some() {
            prior.notes = Some(progress.notes.clone());
        }
        if self.proof_description.is_some() {
            prior.proof_description = Some(progress.proof_description.clone());
        }
        progress.edit_history.push(ProgressEdit {
            timestamp: Utc::now(),
            changes: prior,
        });

        if let Some(completed) = self.completed {
            progress.completed = completed;
        }
        if let Some(points) = self.points {
            progress.points = points;
        }
        if let Some(quantity) = self.quantity {
            progress.quantity = Some(quantity);
        }
        if let Some(notes) = self.notes {
            progress.notes = notes;
        }
        if let Some(proof) = self.proof_description {
            progress.proof_description = proof;
        }
    }
}
