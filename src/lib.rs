// src/lib.rs
use anyhow::Result;
use app_state::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};
use std::env;

use handlers::{
    active_rooms, create_room, delete_room, get_room, health_check, join_room, leaderboard,
    leave_room, login, logout, metrics_handler, public_rooms, repair_statuses, room_progress,
    root_handler, signup, submit_progress, track_http_metrics, update_profile, update_progress,
};

// Public surface
pub mod domain;

// Crate-internal modules
mod analytics;
mod app_state;
mod auth;
mod config;
mod handlers;
mod infrastructure;
mod storage;

pub use config::*;

// Backend factories, re-exported for the binary and the test suite
pub use infrastructure::{
    create_memory_store, // ---
    create_noop_metrics,
    create_prom_metrics,
    create_redis_store,
};

/// Build the HTTP router with store and metrics backends determined by environment variables.
pub fn create_router() -> Result<Router> {
    // ---
    // Resolve configuration up front
    let config = AppConfig::from_env()?;

    // Metrics backend comes from the environment
    let metrics_type = env::var("ROOMS_METRICS_TYPE").unwrap_or_else(|_| "noop".to_string());
    let metrics = if metrics_type == "prom" {
        create_prom_metrics()?
    } else {
        create_noop_metrics()?
    };

    tracing_subscriber::fmt::try_init().ok(); // ✅ Ignores if already initialized

    // Determine the key-value backend; the in-memory store keeps local
    // runs and tests free of a live Redis.
    let store_type = env::var("ROOMS_STORE_TYPE").unwrap_or_else(|_| "redis".to_string());
    let kv = if store_type == "memory" {
        create_memory_store()
    } else {
        create_redis_store(&config.store.redis_url)?
    };
    let db = storage::Database::new(kv);

    // Wire the state container handlers pull from
    let app_state = AppState::new(db, metrics, config.auth.clone());

    let router = Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .nest(
            "/auth",
            Router::new()
                .route("/signup", post(signup))
                .route("/login", post(login))
                .route("/logout", post(logout))
                .route("/update-profile", put(update_profile)),
        )
        .nest(
            "/rooms",
            Router::new()
                .route("/create", post(create_room))
                .route("/join", post(join_room))
                .route("/leave", post(leave_room))
                .route("/active", get(active_rooms))
                .route("/public", get(public_rooms))
                .route("/repair-status", post(repair_statuses))
                .route("/{code}", get(get_room).delete(delete_room))
                .route("/{code}/leaderboard", get(leaderboard)),
        )
        .nest(
            "/progress",
            Router::new()
                .route("/submit", post(submit_progress))
                .route("/update", put(update_progress))
                .route("/{room_code}", get(room_progress)),
        )
        .layer(axum::middleware::from_fn_with_state(
            app_state.clone(),
            track_http_metrics,
        ))
        .with_state(app_state);

    Ok(router)
}
