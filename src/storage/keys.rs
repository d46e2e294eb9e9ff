//! Key layout for the key-value backend.
//!
//! Records live under `{entity}:{id}` keys; membership indexes are sets.
//! Progress records and sessions build their own keys (the record id is
//! the key), so only the remaining entities and indexes appear here.

/// Record key for a user.
pub fn user(username: &str) -> String {
    format!("user:{username}")
}

/// Set of all registered usernames.
pub const USERS: &str = "users";

/// Record key for a room.
pub fn room(code: &str) -> String {
    format!("room:{code}")
}

/// Set of all room codes.
pub const ROOMS: &str = "rooms";

/// Set of usernames participating in a room.
pub fn room_participants(code: &str) -> String {
    format!("room_participants:{code}")
}

/// Set of progress-record ids submitted to a room.
pub fn room_progress(code: &str) -> String {
    format!("room_progress:{code}")
}

/// Set of progress-record ids submitted by a user, across rooms.
pub fn user_progress(username: &str) -> String {
    format!("user_progress:{username}")
}

/// Set of room codes a user belongs to.
pub fn user_rooms(username: &str) -> String {
    format!("user_rooms:{username}")
}

/// Set of session ids belonging to a user.
pub fn user_sessions(username: &str) -> String {
    format!("user_sessions:{username}")
}
