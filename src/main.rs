use analytics_bridge::{router, AnalyticsConfig, AppState};
use std::net::SocketAddr;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = AnalyticsConfig::from_env();
    match &config.store_dir {
        Some(dir) => info!("embedded store at {}", dir.display()),
        None => info!("no embedded store configured"),
    }
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = router(AppState::from_config(config));

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {err}");
    }
    info!("shutting down");
}
