//! Completion notifier that feeds the `pomodoros` counter

use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, warn};

use super::counters::{AnalyticsCounters, CounterEvent};
use crate::timer::CompletionNotifier;

/// Bumps the `pomodoros` counter on the blocking pool; never blocks the timer
pub struct AnalyticsNotifier {
    counters: Arc<AnalyticsCounters>,
    runtime: Handle,
}

impl AnalyticsNotifier {
    pub fn new(counters: Arc<AnalyticsCounters>, runtime: Handle) -> Self {
        Self { counters, runtime }
    }
}

impl CompletionNotifier for AnalyticsNotifier {
    fn focus_completed(&self, completed_count: u32, minutes_added: u32) {
        debug!(
            "Focus session {} completed (+{} min), tracking pomodoro",
            completed_count, minutes_added
        );
        let counters = Arc::clone(&self.counters);
        // Takes a std lock and writes to storage
        self.runtime.spawn_blocking(move || {
            if let Err(e) = counters.increment(CounterEvent::Pomodoros) {
                warn!("Failed to track pomodoro: {}", e);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{storage::MemoryStore, timer::FakeClock};
    use std::time::Duration;

    #[tokio::test]
    async fn completion_is_counted_off_the_async_workers() {
        let counters = Arc::new(AnalyticsCounters::open(
            Arc::new(MemoryStore::new()),
            Arc::new(FakeClock::new()),
        ));
        let notifier = AnalyticsNotifier::new(Arc::clone(&counters), Handle::current());

        notifier.focus_completed(1, 25);

        for _ in 0..100 {
            if counters.totals().unwrap().pomodoros == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(counters.totals().unwrap().pomodoros, 1);
    }
}
