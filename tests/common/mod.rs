// Test helpers are intentionally partially used
#![allow(dead_code)]

use challenge_rooms_api::create_router;
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::Once;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::sleep;

macro_rules! set_env_if_unset {
    // ---
    ($key:expr, $val:expr) => {
        if std::env::var($key).is_err() {
            std::env::set_var($key, $val);
        }
    };
}

static INIT: Once = Once::new();

// ============================================================================
// Test Setup
// ============================================================================

/// Initialize test environment variables once.
///
/// Every server runs against a private in-memory store, so the suite
/// needs no live Redis.
pub async fn setup_test_env() {
    // ---
    INIT.call_once(|| {
        // ---
        set_env_if_unset!("ROOMS_TOKEN_SECRET", "test-secret-not-for-production");
        set_env_if_unset!("ROOMS_STORE_TYPE", "memory");
        set_env_if_unset!("ROOMS_METRICS_TYPE", "noop");
    });
}

pub struct TestServer {
    pub addr: std::net::SocketAddr,
    pub client: Client,
}

impl TestServer {
    // ---
    pub async fn new() -> Self {
        // --

        let app = create_router().expect("Should be able to create router");
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // Serve on a background task
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Let the listener come up before the first request
        sleep(Duration::from_millis(100)).await;

        let client = cookie_client();

        Self { addr, client }
    }

    pub fn url(&self, path: &str) -> String {
        // ---
        format!("http://{}{}", self.addr, path)
    }
}

/// A client with its own cookie jar, i.e. its own login identity.
pub fn cookie_client() -> Client {
    // ---
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Should be able to build a client")
}

// ============================================================================
// Flow helpers
// ============================================================================

/// Sign `username` up and log them in on `client`, leaving the session
/// and token cookies in the client's jar.
pub async fn signup_and_login(server: &TestServer, client: &Client, username: &str) {
    // ---
    let res = client
        .post(server.url("/auth/signup"))
        .json(&json!({
            "username": username,
            "password": "hunter22",
            "confirmPassword": "hunter22",
        }))
        .send()
        .await
        .expect("signup request should succeed");
    assert_eq!(res.status(), 201, "signup for {username} should succeed");

    let res = client
        .post(server.url("/auth/login"))
        .json(&json!({ "username": username, "password": "hunter22" }))
        .send()
        .await
        .expect("login request should succeed");
    assert_eq!(res.status(), 200, "login for {username} should succeed");
}

/// Create a room as the identity behind `client` and return its code.
///
/// `overrides` is merged over a sane default request body.
pub async fn create_room(server: &TestServer, client: &Client, overrides: Value) -> String {
    // ---
    let mut body = json!({
        "name": "Pushups",
        "description": "30 a day",
        "challengeType": "fitness",
        "duration": 30,
        "maxParticipants": 10,
        "scoringType": "binary",
        "hasAdmin": true,
    });
    if let (Some(base), Some(extra)) = (body.as_object_mut(), overrides.as_object()) {
        for (k, v) in extra {
            base.insert(k.clone(), v.clone());
        }
    }

    let res = client
        .post(server.url("/rooms/create"))
        .json(&body)
        .send()
        .await
        .expect("create room request should succeed");
    assert_eq!(res.status(), 201, "room creation should succeed");

    let body: Value = res.json().await.expect("room creation response is JSON");
    body["data"]["roomCode"]
        .as_str()
        .expect("room creation response carries the code")
        .to_string()
}
