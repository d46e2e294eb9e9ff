use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::app_state::AppState;
use crate::auth;
use crate::domain::{
    DomainError, NewProgress, Progress, ProgressUpdate, Room, RoomStatus, ScoringType,
};
use crate::handlers::shared_types::{ApiError, ApiResponse};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitProgressRequest {
    room_code: Option<String>,
    completed: Option<bool>,
    points: Option<i64>,
    quantity: Option<i64>,
    notes: Option<String>,
    proof_description: Option<String>,
    /// Calendar day the submission is for; defaults to today.
    date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProgressRequest {
    #[serde(default)]
    progress_id: String,
    #[serde(flatten)]
    changes: ProgressUpdate,
}

#[derive(Serialize)]
pub struct ProgressData {
    progress: Progress,
}

/// Handler for daily progress submission (POST /progress/submit).
///
/// Checks run in a fixed order so the caller always learns the most
/// fundamental problem first: input shape, room existence, membership,
/// room state, lateness policy, then the one-per-day rule.
///
/// - On success, responds with `201 Created` and the stored record.
/// - A repeat submission for the same day responds with `409 Conflict`.
#[tracing::instrument(skip(state, headers, req))]
pub async fn submit_progress(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SubmitProgressRequest>,
) -> Result<(StatusCode, ApiResponse<ProgressData>), ApiError> {
    // ---
    let user = auth::require_user(&state, &headers).await?;

    let room_code = req.room_code.unwrap_or_default();
    let completed = match req.completed {
        Some(completed) if !room_code.is_empty() => completed,
        _ => {
            return Err(DomainError::Validation(
                "Room code and completion status are required".into(),
            )
            .into())
        }
    };
    if req.points.is_some_and(|p| p < 0) || req.quantity.is_some_and(|q| q < 0) {
        return Err(
            DomainError::Validation("Points and quantity cannot be negative".into()).into(),
        );
    }

    let db = state.db();
    let room = db
        .rooms()
        .get(&room_code)
        .await?
        .ok_or_else(|| DomainError::NotFound("Room not found".into()))?;
    if !room.is_participant(&user.username) {
        return Err(
            DomainError::Forbidden("You are not a participant in this room".into()).into(),
        );
    }
    if room.status != RoomStatus::Active {
        return Err(DomainError::InvalidState(format!(
            "Room is not active (status: {})",
            room.status
        ))
        .into());
    }

    let now = Utc::now();
    let target_date = req.date.unwrap_or_else(|| now.date_naive());
    let late = is_late(now, target_date);
    if late && !room.allow_late_submissions {
        return Err(DomainError::LateSubmissionRejected.into());
    }

    let existing = db.progress().for_user(&room_code, &user.username).await?;
    if existing.iter().any(|p| p.date == target_date) {
        return Err(DomainError::DuplicateSubmission.into());
    }

    let points = compute_points(&room, completed, req.points, req.quantity, late);
    let progress = db
        .progress()
        .submit(NewProgress {
            room_code,
            username: user.username,
            date: target_date,
            completed,
            points,
            quantity: req.quantity,
            notes: req.notes.unwrap_or_default(),
            proof_description: req.proof_description.unwrap_or_default(),
            is_late_submission: late,
        })
        .await?;

    state.metrics().record_progress_submitted();
    tracing::info!(
        code = %progress.room_code,
        username = %progress.username,
        date = %progress.date,
        points = progress.points,
        late,
        "Progress submitted"
    );

    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(ProgressData { progress }, "Progress submitted successfully"),
    ))
}

/// Handler for a room's full submission history (GET /progress/{room_code}),
/// newest day first. An unknown room yields an empty list.
#[tracing::instrument(skip(state))]
pub async fn room_progress(
    State(state): State<AppState>,
    Path(room_code): Path<String>,
) -> Result<ApiResponse<Vec<Progress>>, ApiError> {
    // ---
    let records = state.db().progress().for_room(&room_code).await?;
    Ok(ApiResponse::with_message(
        records,
        "Progress fetched successfully",
    ))
}

/// Handler for editing a past submission (PUT /progress/update).
///
/// Only the record's owner may edit it; replaced values are kept in the
/// record's edit history.
#[tracing::instrument(skip(state, headers, req))]
pub async fn update_progress(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<UpdateProgressRequest>,
) -> Result<ApiResponse<ProgressData>, ApiError> {
    // ---
    let user = auth::require_user(&state, &headers).await?;

    if req.progress_id.is_empty() {
        return Err(DomainError::Validation("Progress record id is required".into()).into());
    }
    if req.changes.is_empty() {
        return Err(DomainError::Validation("No fields to update".into()).into());
    }
    if req.changes.points.is_some_and(|p| p < 0) || req.changes.quantity.is_some_and(|q| q < 0) {
        return Err(
            DomainError::Validation("Points and quantity cannot be negative".into()).into(),
        );
    }

    let db = state.db();
    let record = db
        .progress()
        .get(&req.progress_id)
        .await?
        .ok_or_else(|| DomainError::NotFound("Progress record not found".into()))?;
    if record.username != user.username {
        return Err(DomainError::Forbidden("You can only edit your own progress".into()).into());
    }

    let progress = db.progress().update(&req.progress_id, req.changes).await?;
    Ok(ApiResponse::with_message(
        ProgressData { progress },
        "Progress updated successfully",
    ))
}

/// A submission is late once the wall clock passes the last instant of
/// its target day.
fn is_late(now: DateTime<Utc>, target_date: NaiveDate) -> bool {
    // ---
    target_date
        .and_hms_milli_opt(23, 59, 59, 999)
        .map(|end| now > end.and_utc())
        .unwrap_or(false)
}

/// Scoring rules: incomplete days score zero; binary rooms award a flat
/// point; points rooms take the first value given of points, quantity,
/// or the room's daily target. A late submission in a penalizing room
/// keeps half, floored.
fn compute_points(
    room: &Room,
    completed: bool,
    points: Option<i64>,
    quantity: Option<i64>,
    late: bool,
) -> i64 {
    // ---
    let base = if !completed {
        0
    } else {
        match room.scoring_type {
            ScoringType::Binary => 1,
            ScoringType::Points => points.or(quantity).unwrap_or(room.daily_target),
        }
    };
    if late && room.penalize_late_submissions {
        base / 2
    } else {
        base
    }
}
