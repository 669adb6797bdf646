//! Anonymous usage analytics
//!
//! Three counters (`visits`, `shares`, `pomodoros`) with per-month buckets.
//! Nothing in here may block or fail the timer.

pub mod counters;
pub mod notifier;
pub mod visits;

pub use counters::{AnalyticsCounters, AnalyticsTotals, CounterEvent};
pub use notifier::AnalyticsNotifier;
pub use visits::record_visit;

use thiserror::Error;

use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("Invalid event type: {0}")]
    InvalidEvent(String),

    #[error("analytics counters lock poisoned")]
    LockPoisoned,

    #[error(transparent)]
    Storage(#[from] StorageError),
}
