//! Pocket Tools - A state-managed HTTP server for small handheld utilities
//!
//! This is the main entry point for the pocket-tools application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use pocket_tools::{
    api::create_router,
    config::Config,
    state::AppState,
    tasks::spawn_expiry_notifier,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("pocket_tools={},tower_http=info", config.log_level()))
        .init();

    info!("Starting pocket-tools server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, tick={}ms, max_tilt={}deg, radius={}px",
          config.host, config.port, config.tick_ms, config.max_tilt, config.level_radius);

    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        config.tick_interval(),
        config.level_calibration(),
    ));

    // Record countdown expiries in the notification feed
    spawn_expiry_notifier(Arc::clone(&state));

    let app = create_router(Arc::clone(&state));

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /timer/start       - Start a countdown ({{minutes, seconds}})");
    info!("  POST /timer/cancel      - Cancel the countdown");
    info!("  GET  /timer             - Current countdown");
    info!("  GET  /timer/events      - Countdown updates (SSE)");
    info!("  POST /flashlight/toggle - Toggle the flashlight");
    info!("  GET  /flashlight        - Flashlight state");
    info!("  POST /level/reading     - Submit a tilt reading ({{x, y}})");
    info!("  GET  /level             - Bubble position");
    info!("  GET  /notifications     - Notification feed");
    info!("  GET  /status            - Overall status");
    info!("  GET  /health            - Health check");

    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    if state.countdown.snapshot().is_running() {
        if let Err(e) = state.cancel_timer() {
            tracing::warn!("Failed to cancel countdown on shutdown: {}", e);
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
