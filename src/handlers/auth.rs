use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::AppendHeaders;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::app_state::AppState;
use crate::auth;
use crate::domain::{DomainError, NewUser, Session, UserSettings, UserUpdate, UserView};
use crate::handlers::shared_types::{ApiError, ApiResponse};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    // Absent fields fall back to empty strings so the validators can
    // answer with field-specific messages instead of a decode error.
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    confirm_password: String,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

#[derive(Serialize)]
pub struct LoginData {
    user: UserView,
    session: Session,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    email: Option<String>,
    email_notifications: bool,
    reminder_time: String,
    timezone: String,
}

/// Handler for account creation (POST /auth/signup).
///
/// Validates the username, password, and optional email, then persists
/// the account with a hashed password.
///
/// - On success, responds with `201 Created` and the new user (sans hash).
/// - If the username is taken, responds with `409 Conflict`.
/// - Any failed validation responds with `400 Bad Request`.
#[tracing::instrument(skip(state, req))]
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, ApiResponse<UserView>), ApiError> {
    // ---
    auth::validate_username(&req.username)?;
    auth::validate_password(&req.password)?;
    if req.password != req.confirm_password {
        return Err(DomainError::Validation("Passwords do not match".into()).into());
    }

    let email = req.email.filter(|e| !e.is_empty());
    if let Some(email) = &email {
        auth::validate_email(email)?;
    }

    let user = state
        .db()
        .users()
        .create(NewUser {
            username: req.username,
            password: req.password,
            email,
        })
        .await?;

    state.metrics().record_user_signup();
    tracing::info!(username = %user.username, "User signed up");

    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(UserView::from(&user), "User created successfully"),
    ))
}

/// Handler for logging in (POST /auth/login).
///
/// Checks the password, opens a server-side session, and mints a signed
/// token; both are also set as HttpOnly cookies.
///
/// - On success, responds with `200 OK`, the user, and the session.
/// - Unknown users and wrong passwords both respond with `401` and the
///   same message, so the endpoint does not confirm which usernames exist.
#[tracing::instrument(skip(state, headers, req))]
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    // ---
    if req.username.is_empty() || req.password.is_empty() {
        return Err(DomainError::Validation("Username and password are required".into()).into());
    }

    let db = state.db();
    let user = db
        .users()
        .get(&req.username)
        .await?
        .ok_or(DomainError::InvalidCredentials)?;
    if !auth::verify_password(&req.password, &user.password) {
        return Err(DomainError::InvalidCredentials.into());
    }

    let session = db
        .sessions()
        .create(
            &user.username,
            &auth::device_info(&headers),
            state.auth().session_ttl(),
        )
        .await?;
    let token = auth::issue_token(
        &user.username,
        &state.auth().token_secret,
        state.auth().token_ttl(),
    )?;

    let user = db
        .users()
        .update(
            &user.username,
            UserUpdate {
                last_login: Some(Utc::now()),
                ..Default::default()
            },
        )
        .await?;

    tracing::info!(username = %user.username, "User logged in");

    let max_age = state.auth().cookie_max_age_secs();
    let cookies = AppendHeaders([
        (
            header::SET_COOKIE,
            auth::build_cookie(auth::SESSION_COOKIE, &session.session_id, max_age),
        ),
        (
            header::SET_COOKIE,
            auth::build_cookie(auth::TOKEN_COOKIE, &token, max_age),
        ),
    ]);

    Ok((
        cookies,
        ApiResponse::with_message(
            LoginData {
                user: UserView::from(&user),
                session,
            },
            "Login successful",
        ),
    ))
}

/// Handler for logging out (POST /auth/logout).
///
/// Deletes the presented session, if any, and expires both credential
/// cookies. Safe to call without being logged in.
#[tracing::instrument(skip(state, headers))]
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    // ---
    let user = auth::current_user(&state, &headers).await?;
    if user.is_some() {
        if let Some(session_id) = auth::cookie_value(&headers, auth::SESSION_COOKIE) {
            state.db().sessions().delete(&session_id).await?;
        }
    }

    let cookies = AppendHeaders([
        (header::SET_COOKIE, auth::clear_cookie(auth::SESSION_COOKIE)),
        (header::SET_COOKIE, auth::clear_cookie(auth::TOKEN_COOKIE)),
    ]);

    Ok((cookies, ApiResponse::message_only("Logged out successfully")))
}

/// Handler for profile updates (PUT /auth/update-profile).
///
/// Replaces the caller's notification settings wholesale and, when a
/// non-empty email is provided, validates and stores it. Omitting the
/// email leaves the stored one untouched.
#[tracing::instrument(skip(state, headers, req))]
pub async fn update_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<ApiResponse<()>, ApiError> {
    // ---
    let user = auth::require_user(&state, &headers).await?;

    let email = req.email.filter(|e| !e.is_empty());
    if let Some(email) = &email {
        auth::validate_email(email)?;
    }

    state
        .db()
        .users()
        .update(
            &user.username,
            UserUpdate {
                email,
                settings: Some(UserSettings {
                    email_notifications: req.email_notifications,
                    reminder_time: req.reminder_time,
                    timezone: req.timezone,
                }),
                ..Default::default()
            },
        )
        .await?;

    Ok(ApiResponse::message_only("Profile updated successfully"))
}
