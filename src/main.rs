//! Punch In - A state-managed HTTP server for multi-job time tracking
//!
//! This is the main entry point for the punch-in application.

use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tracing::info;

use punch_in::{
    api::create_router,
    config::Config,
    state::AppState,
    tasks::snapshot_ticker_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("punch_in={},tower_http=info", config.log_level()))
        .init();

    info!("Starting punch-in server v1.0.0");
    info!(
        "Configuration: host={}, port={}, seed={}, tick={}ms",
        config.host, config.port, config.seed, config.tick_ms
    );

    // Create application state with the seeded registry
    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        config.seed,
        config.staff.clone(),
    ));

    // Start the snapshot ticker background task
    let ticker_state = Arc::clone(&state);
    let tick = Duration::from_millis(config.tick_ms);
    let ticker = tokio::spawn(async move {
        snapshot_ticker_task(ticker_state, tick).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /timers             - Create a timer");
    info!("  GET  /timers             - List timers (?view=archived)");
    info!("  PUT  /timers/:id         - Edit a timer");
    info!("  POST /timers/:id/toggle  - Start or stop a timer");
    info!("  POST /timers/:id/archive - Archive a timer");
    info!("  POST /timers/:id/restore - Restore a timer");
    info!("  POST /clear              - Reset all non-archived timers");
    info!("  GET  /export             - Download timesheet CSV");
    info!("  GET  /status             - Check current status");
    info!("  GET  /events             - Subscribe to snapshot updates");
    info!("  GET  /health             - Health check");

    // Setup graceful shutdown
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

    // Release the ticker handle so no callbacks outlive the server
    ticker.abort();

    info!("Server shutdown complete");
    Ok(())
}
