use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::analytics::{compute_leaderboard, LeaderboardEntry};
use crate::app_state::AppState;
use crate::auth;
use crate::domain::{AdminTransferRule, DomainError, NewRoom, Room, ScoringType};
use crate::handlers::shared_types::{ApiError, ApiResponse};
use crate::storage::StatusRepair;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    challenge_type: String,
    // Zero doubles as "absent" for the two numeric fields; both get
    // rejected by the range checks below.
    #[serde(default)]
    duration: i64,
    #[serde(default)]
    max_participants: i64,
    #[serde(default = "default_scoring_type")]
    scoring_type: ScoringType,
    #[serde(default = "default_daily_target")]
    daily_target: i64,
    #[serde(default)]
    admin_transfer_rules: AdminTransferRule,
    #[serde(default)]
    has_admin: bool,
    #[serde(default)]
    is_public: bool,
    #[serde(default)]
    require_proof: bool,
    #[serde(default)]
    allow_late_submissions: bool,
    #[serde(default)]
    penalize_late_submissions: bool,
}

fn default_scoring_type() -> ScoringType {
    // ---
    ScoringType::Binary
}

fn default_daily_target() -> i64 {
    // ---
    1
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomCodeRequest {
    #[serde(default)]
    room_code: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomData {
    room: Room,
    room_code: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomData {
    room_code: String,
}

#[derive(Serialize)]
pub struct LeaderboardData {
    leaderboard: Vec<LeaderboardEntry>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairReport {
    total_rooms: usize,
    results: Vec<StatusRepair>,
}

/// Handler for room creation (POST /rooms/create).
///
/// Validates the challenge parameters, then creates the room under a
/// freshly generated join code with the caller as first participant.
///
/// - On success, responds with `201 Created`, the room, and its code.
/// - Failed validation responds with `400 Bad Request`.
#[tracing::instrument(skip(state, headers, req))]
pub async fn create_room(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateRoomRequest>,
) -> Result<(StatusCode, ApiResponse<CreateRoomData>), ApiError> {
    // ---
    let user = auth::require_user(&state, &headers).await?;

    if req.name.is_empty()
        || req.description.is_empty()
        || req.challenge_type.is_empty()
        || req.duration == 0
    {
        return Err(DomainError::Validation("Missing required fields".into()).into());
    }
    if !(1..=365).contains(&req.duration) {
        return Err(
            DomainError::Validation("Duration must be between 1 and 365 days".into()).into(),
        );
    }
    if !(2..=100).contains(&req.max_participants) {
        return Err(
            DomainError::Validation("Max participants must be between 2 and 100".into()).into(),
        );
    }

    let room = state
        .db()
        .rooms()
        .create(NewRoom {
            name: req.name,
            description: req.description,
            created_by: user.username,
            max_participants: req.max_participants as u32,
            has_admin: req.has_admin,
            is_public: req.is_public,
            admin_transfer_rules: req.admin_transfer_rules,
            challenge_type: req.challenge_type,
            duration: req.duration as u32,
            scoring_type: req.scoring_type,
            daily_target: req.daily_target,
            require_proof: req.require_proof,
            allow_late_submissions: req.allow_late_submissions,
            penalize_late_submissions: req.penalize_late_submissions,
        })
        .await?;

    state.metrics().record_room_created();
    tracing::info!(code = %room.code, status = %room.status, "Room created");

    let room_code = room.code.clone();
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(
            CreateRoomData { room, room_code },
            "Room created successfully",
        ),
    ))
}

/// Handler for joining a room by code (POST /rooms/join).
///
/// - Unknown codes respond with `404`; codes are case-sensitive.
/// - Rejoining responds with `409`, as does a room already at capacity.
#[tracing::instrument(skip(state, headers, req))]
pub async fn join_room(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<RoomCodeRequest>,
) -> Result<ApiResponse<JoinRoomData>, ApiError> {
    // ---
    let user = auth::require_user(&state, &headers).await?;
    if req.room_code.is_empty() {
        return Err(DomainError::Validation("Room code is required".into()).into());
    }

    state
        .db()
        .rooms()
        .add_participant(&req.room_code, &user.username)
        .await?;

    tracing::info!(code = %req.room_code, username = %user.username, "Participant joined");

    Ok(ApiResponse::with_message(
        JoinRoomData {
            room_code: req.room_code,
        },
        "Successfully joined room",
    ))
}

/// Handler for leaving a room (POST /rooms/leave).
///
/// Departure of the current admin hands the seat to a successor; the
/// last participant out archives the room.
#[tracing::instrument(skip(state, headers, req))]
pub async fn leave_room(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<RoomCodeRequest>,
) -> Result<ApiResponse<JoinRoomData>, ApiError> {
    // ---
    let user = auth::require_user(&state, &headers).await?;
    if req.room_code.is_empty() {
        return Err(DomainError::Validation("Room code is required".into()).into());
    }

    let db = state.db();
    let room = db
        .rooms()
        .get(&req.room_code)
        .await?
        .ok_or_else(|| DomainError::NotFound("Room not found".into()))?;
    if !room.is_participant(&user.username) {
        return Err(
            DomainError::Forbidden("You are not a participant in this room".into()).into(),
        );
    }

    db.rooms()
        .remove_participant(&req.room_code, &user.username)
        .await?;

    tracing::info!(code = %req.room_code, username = %user.username, "Participant left");

    Ok(ApiResponse::with_message(
        JoinRoomData {
            room_code: req.room_code,
        },
        "Successfully left room",
    ))
}

/// Handler for fetching a single room (GET /rooms/{code}).
#[tracing::instrument(skip(state))]
pub async fn get_room(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<ApiResponse<Room>, ApiError> {
    // ---
    let room = state
        .db()
        .rooms()
        .get(&code)
        .await?
        .ok_or_else(|| DomainError::NotFound("Room not found".into()))?;
    Ok(ApiResponse::data(room))
}

/// Handler for deleting a room (DELETE /rooms/{code}).
///
/// Restricted to the creator or the current admin. Removes the room,
/// all of its progress records, and every index entry pointing at it.
#[tracing::instrument(skip(state, headers))]
pub async fn delete_room(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(code): Path<String>,
) -> Result<ApiResponse<()>, ApiError> {
    // ---
    let user = auth::require_user(&state, &headers).await?;

    let db = state.db();
    let room = db
        .rooms()
        .get(&code)
        .await?
        .ok_or_else(|| DomainError::NotFound("Room not found".into()))?;

    let allowed = room.created_by == user.username
        || room.current_admin.as_deref() == Some(user.username.as_str());
    if !allowed {
        return Err(DomainError::Forbidden(
            "Only the room creator or admin can delete this room".into(),
        )
        .into());
    }

    db.rooms().delete(&code).await?;
    tracing::info!(code = %code, username = %user.username, "Room deleted");

    Ok(ApiResponse::message_only("Room deleted successfully"))
}

/// Handler for a room's leaderboard (GET /rooms/{code}/leaderboard).
///
/// Recomputed on demand from the room's full progress history; every
/// current participant gets a row even without submissions.
#[tracing::instrument(skip(state))]
pub async fn leaderboard(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<ApiResponse<LeaderboardData>, ApiError> {
    // ---
    let db = state.db();
    let room = db
        .rooms()
        .get(&code)
        .await?
        .ok_or_else(|| DomainError::NotFound("Room not found".into()))?;
    let progress = db.progress().for_room(&code).await?;

    let leaderboard =
        compute_leaderboard(&room.participants, &progress, Utc::now().date_naive());
    Ok(ApiResponse::data(LeaderboardData { leaderboard }))
}

/// Handler for the caller's active rooms (GET /rooms/active), most
/// recently active first.
#[tracing::instrument(skip(state, headers))]
pub async fn active_rooms(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<ApiResponse<Vec<Room>>, ApiError> {
    // ---
    let user = auth::require_user(&state, &headers).await?;
    let rooms = state.db().rooms().active_rooms_for(&user.username).await?;
    Ok(ApiResponse::data(rooms))
}

/// Handler for the public room directory (GET /rooms/public), newest
/// first. No authentication required.
#[tracing::instrument(skip(state))]
pub async fn public_rooms(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<Room>>, ApiError> {
    // ---
    let rooms = state.db().rooms().public_rooms().await?;
    Ok(ApiResponse::data(rooms))
}

/// Handler for the status-repair sweep (POST /rooms/repair-status).
///
/// Promotes rooms stuck in `pending` back to `active` and reports the
/// outcome for every room inspected.
#[tracing::instrument(skip(state, headers))]
pub async fn repair_statuses(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<ApiResponse<RepairReport>, ApiError> {
    // ---
    auth::require_user(&state, &headers).await?;

    let results = state.db().rooms().repair_statuses().await?;
    let fixed = results.iter().filter(|r| r.fixed).count();
    tracing::info!(total = results.len(), fixed, "Room status sweep finished");

    Ok(ApiResponse::data(RepairReport {
        total_rooms: results.len(),
        results,
    }))
}
