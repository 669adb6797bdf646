//! Rolling 24-hour visit tracking

use std::time::Duration;
use tracing::{debug, info, warn};

use super::counters::{AnalyticsCounters, CounterEvent};
use crate::{
    storage::{StoragePort, LAST_VISIT_KEY},
    timer::Clock,
};

/// Minimum gap between two counted visits
pub const VISIT_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

/// Count a visit unless one was counted within the last [`VISIT_WINDOW`].
///
/// The timestamp is written before the counter is bumped so a concurrent
/// second start cannot count twice. Returns whether a visit was counted;
/// failures are logged and never propagate.
pub fn record_visit(
    storage: &dyn StoragePort,
    counters: &AnalyticsCounters,
    clock: &dyn Clock,
) -> bool {
    let now = clock.now_ms();
    let last_visit = match storage.get(LAST_VISIT_KEY) {
        Ok(raw) => raw.and_then(|s| s.trim().parse::<i64>().ok()),
        Err(e) => {
            warn!("Failed to read last visit timestamp: {}", e);
            None
        }
    };

    let window_ms = i64::try_from(VISIT_WINDOW.as_millis()).unwrap_or(i64::MAX);
    if let Some(last) = last_visit {
        if now.saturating_sub(last) <= window_ms {
            debug!("Visit already counted within the last 24 hours");
            return false;
        }
    }

    if let Err(e) = storage.set(LAST_VISIT_KEY, &now.to_string()) {
        warn!("Failed to store last visit timestamp: {}", e);
    }

    match counters.increment(CounterEvent::Visits) {
        Ok(total) => {
            info!("Visit recorded (total visits: {})", total);
            true
        }
        Err(e) => {
            warn!("Failed to track visit: {}", e);
            false
        }
    }
}
