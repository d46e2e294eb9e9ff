use axum::response::IntoResponse;

pub async fn root_handler() -> impl IntoResponse {
    let version = env!("CARGO_PKG_VERSION");
    format!(
        r#"Welcome to the Challenge Rooms API 👋
Version: {version}

Available endpoints:
  - POST   /auth/signup                - Create an account
  - POST   /auth/login                 - Log in (sets session + token cookies)
  - POST   /auth/logout                - Log out and clear credentials
  - PUT    /auth/update-profile        - Update email and notification settings
  - POST   /rooms/create               - Create a challenge room
  - POST   /rooms/join                 - Join a room by code
  - POST   /rooms/leave                - Leave a room
  - GET    /rooms/active               - Your active rooms
  - GET    /rooms/public               - Public room directory
  - GET    /rooms/{{code}}               - Fetch a room
  - DELETE /rooms/{{code}}               - Delete a room (creator/admin only)
  - GET    /rooms/{{code}}/leaderboard   - Room leaderboard
  - POST   /rooms/repair-status        - Repair rooms stuck in pending
  - POST   /progress/submit            - Submit daily progress
  - PUT    /progress/update            - Edit a past submission
  - GET    /progress/{{room_code}}       - A room's submission history
  - GET    /health                     - Light health check
  - GET    /health?mode=full           - Full health check (includes the store)
  - GET    /metrics                    - Prometheus metrics

This API tracks group challenges: users create time-boxed rooms, invite others by
code, submit daily progress, and compete on per-room leaderboards.
"#
    )
}
