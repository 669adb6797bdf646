//! Focus Timer - A drift-resistant Pomodoro timer served over HTTP
//!
//! This is the main entry point for the focus-timer application.

use std::sync::Arc;
use tokio::{net::TcpListener, runtime::Handle};
use tracing::info;

use focus_timer::{
    analytics::record_visit,
    api::create_router,
    config::Config,
    state::AppState,
    storage::{FileStore, StoragePort},
    tasks::{timer_driver_task, wake_detector_task},
    timer::{Clock, Scheduler, SystemClock, TokioScheduler},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("focus_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting focus-timer server v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, data_dir={}, silent={}",
        config.host,
        config.port,
        config.data_dir.display(),
        config.silent
    );

    let storage: Arc<dyn StoragePort> = Arc::new(FileStore::open(&config.data_dir)?);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let runtime = Handle::current();
    let scheduler: Arc<dyn Scheduler> = Arc::new(TokioScheduler::new(runtime.clone()));

    // Create application state
    let (state, events_rx) = AppState::assemble(
        &config,
        Arc::clone(&storage),
        Arc::clone(&clock),
        scheduler,
        runtime,
    );

    record_visit(storage.as_ref(), &state.analytics, clock.as_ref());

    // Start background tasks
    let driver_state = Arc::clone(&state);
    tokio::spawn(async move {
        timer_driver_task(driver_state, events_rx).await;
    });

    let wake_state = Arc::clone(&state);
    let wake_every = config.wake_check_interval();
    tokio::spawn(async move {
        wake_detector_task(wake_state, wake_every).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /timer             - Timer view");
    info!("  POST /timer/<action>    - start | pause | toggle | reset | skip");
    info!("  POST /timer/visibility  - Client visibility change");
    info!("  GET  /settings          - Session lengths (PUT to change)");
    info!("  GET  /completed         - Completed sessions summary");
    info!("  GET  /tasks             - Task list");
    info!("  GET  /api/stats/get     - Usage counters");
    info!("  GET  /status            - Server status");
    info!("  GET  /health            - Health check");

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

    // Cancel any scheduled tick and persist the last state
    match state.timer.lock() {
        Ok(mut engine) => engine.shutdown(),
        Err(e) => tracing::warn!("Failed to lock timer on shutdown: {}", e),
    }

    info!("Server shutdown complete");
    Ok(())
}
