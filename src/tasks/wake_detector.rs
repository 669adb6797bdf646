//! Host suspend/resume detection background task

use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::{state::AppState, timer::TimerEvent};

/// Wall-clock time allowed to outrun monotonic time between two checks
pub const WAKE_SLACK: Duration = Duration::from_secs(5);

/// Compares wall-clock against monotonic elapsed time between checks.
///
/// Monotonic time stops while the host is suspended and wall-clock time does
/// not, so a wall-clock gap well beyond the monotonic one means the host
/// slept in between.
#[derive(Debug, Clone, Copy)]
pub struct WakeDetector {
    last_wall_ms: i64,
    last_mono: Instant,
}

impl WakeDetector {
    pub fn new(now_wall_ms: i64, now_mono: Instant) -> Self {
        Self {
            last_wall_ms: now_wall_ms,
            last_mono: now_mono,
        }
    }

    /// Record a check; returns the length of the detected sleep, if any
    pub fn observe(&mut self, now_wall_ms: i64, now_mono: Instant) -> Option<Duration> {
        let wall_ms = now_wall_ms.saturating_sub(self.last_wall_ms).max(0);
        let wall = Duration::from_millis(u64::try_from(wall_ms).unwrap_or(0));
        let mono = now_mono.saturating_duration_since(self.last_mono);

        self.last_wall_ms = now_wall_ms;
        self.last_mono = now_mono;

        let gap = wall.saturating_sub(mono);
        (gap > WAKE_SLACK).then_some(gap)
    }
}

/// Background task that emits a foreground event after the host wakes up
pub async fn wake_detector_task(state: Arc<AppState>, check_every: Duration) {
    info!("Starting wake detector task (every {}s)", check_every.as_secs());

    let mut ticker = interval(check_every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut detector = WakeDetector::new(state.clock.now_ms(), Instant::now());

    loop {
        ticker.tick().await;

        match detector.observe(state.clock.now_ms(), Instant::now()) {
            Some(slept) => {
                info!("System wake-up detected after ~{}s, reconciling timer", slept.as_secs());
                if state.events_tx.send(TimerEvent::Foreground).is_err() {
                    warn!("Timer driver is gone; cannot deliver wake-up event");
                    break;
                }
            }
            None => {
                debug!("No suspension since last check");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steady_clocks_are_not_a_wake() {
        let start = Instant::now();
        let mut detector = WakeDetector::new(1_000_000, start);

        let later = start + Duration::from_secs(15);
        assert_eq!(detector.observe(1_015_000, later), None);

        // A late check moves both clocks together
        let much_later = later + Duration::from_secs(40);
        assert_eq!(detector.observe(1_055_000, much_later), None);
    }

    #[test]
    fn wall_clock_jump_is_a_wake() {
        let start = Instant::now();
        let mut detector = WakeDetector::new(0, start);

        let slept = detector.observe(3_615_000, start + Duration::from_secs(15));
        assert_eq!(slept, Some(Duration::from_secs(3600)));

        // Baseline moves on after a detection
        assert_eq!(detector.observe(3_630_000, start + Duration::from_secs(30)), None);
    }

    #[test]
    fn small_skew_is_tolerated() {
        let start = Instant::now();
        let mut detector = WakeDetector::new(0, start);

        assert_eq!(detector.observe(19_000, start + Duration::from_secs(15)), None);
    }
}
