// Gateway module - controls public API for handlers
// Modules are private, only exported symbols are public

mod auth;
mod health;
mod metrics;
mod progress;
mod root;
mod rooms;
mod shared_types;

// Core handlers
pub use health::health_check;
pub use metrics::{metrics_handler, track_http_metrics};
pub use root::root_handler;

// Account and session handlers
pub use auth::{login, logout, signup, update_profile};

// Room lifecycle handlers
pub use rooms::{
    active_rooms, create_room, delete_room, get_room, join_room, leaderboard, leave_room,
    public_rooms, repair_statuses,
};

// Progress handlers
pub use progress::{room_progress, submit_progress, update_progress};
