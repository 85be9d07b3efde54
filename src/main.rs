use std::sync::Arc;

use jam_server::config::Config;
use jam_server::error::AppErr;
use jam_server::registry::Registry;
use jam_server::{heartbeat, server};

#[tokio::main]
async fn main() -> Result<(), AppErr> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().init();

    let cfg = Config::from_env()?;
    let registry = Arc::new(Registry::new(cfg.room_capacity));

    tokio::spawn(heartbeat::task(registry.clone(), cfg.heartbeat));

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", cfg.port)).await?;
    tracing::info!(
        port = cfg.port,
        capacity = cfg.room_capacity,
        heartbeat_secs = cfg.heartbeat.as_secs(),
        "listening"
    );

    tokio::select! {
        res = server::run(listener, registry.clone()) => res?,
        _ = tokio::signal::ctrl_c() => tracing::info!("shutting down"),
    }
    registry.close_all().await;
    Ok(())
}
