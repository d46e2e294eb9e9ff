use anyhow::Result;
use challenge_rooms_api::{create_router, AppConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up a local .env if present, then initialize tracing to stdout
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let app = create_router()?;
    let endpoint = AppConfig::from_env()?.server.bind_addr;

    info!("Starting at endpoint:{}", endpoint);
    info!(
        "Starting Challenge Rooms API server v{}...",
        env!("CARGO_PKG_VERSION")
    );

    let listener = tokio::net::TcpListener::bind(&endpoint).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
