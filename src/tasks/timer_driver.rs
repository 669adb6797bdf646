//! Timer driver background task

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::{state::AppState, timer::TimerEvent};

/// Background task that applies scheduled ticks and foreground events to the
/// engine, one at a time
pub async fn timer_driver_task(state: Arc<AppState>, mut events_rx: mpsc::UnboundedReceiver<TimerEvent>) {
    info!("Starting timer driver task");

    while let Some(event) = events_rx.recv().await {
        if let Err(e) = state.handle_event(event) {
            error!("Failed to apply {:?} event: {}", event, e);
        }
    }

    info!("Timer event channel closed, stopping timer driver");
}
