//! Recurring tick scheduling
//!
//! The engine asks a [`Scheduler`] for a periodic callback while it runs and
//! drops the returned [`TickHandle`] to stop it. Tick callbacks only signal;
//! the remaining time is always recomputed from the absolute deadline, so a
//! late or skipped callback costs nothing but display latency.

use std::{
    fmt,
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::{
    runtime::Handle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::debug;

/// Callback invoked on every scheduled tick
pub type TickSignal = Arc<dyn Fn() + Send + Sync>;

/// Cancels the scheduled callback when cancelled or dropped
pub struct TickHandle {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl TickHandle {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn cancel(mut self) {
        self.fire_cancel();
    }

    fn fire_cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for TickHandle {
    fn drop(&mut self) {
        self.fire_cancel();
    }
}

impl fmt::Debug for TickHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TickHandle")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Provides cancellable periodic callbacks
pub trait Scheduler: Send + Sync {
    fn every(&self, period: Duration, on_tick: TickSignal) -> TickHandle;
}

/// Scheduler backed by a tokio interval task
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    runtime: Handle,
}

impl TokioScheduler {
    pub fn new(runtime: Handle) -> Self {
        Self { runtime }
    }
}

impl Scheduler for TokioScheduler {
    fn every(&self, period: Duration, on_tick: TickSignal) -> TickHandle {
        let task = self.runtime.spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            // Late ticks are not replayed in a burst
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                on_tick();
            }
        });

        debug!("Scheduled tick every {:?}", period);
        TickHandle::new(move || {
            task.abort();
            debug!("Cancelled scheduled tick");
        })
    }
}

#[derive(Default)]
struct ManualSlots {
    next_id: u64,
    active: Vec<(u64, TickSignal)>,
}

/// Scheduler whose ticks fire only when the test says so
#[derive(Clone, Default)]
pub struct ManualScheduler {
    slots: Arc<Mutex<ManualSlots>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invoke every active callback once; returns how many fired
    pub fn fire(&self) -> usize {
        let signals: Vec<TickSignal> = match self.slots.lock() {
            Ok(slots) => slots.active.iter().map(|(_, s)| Arc::clone(s)).collect(),
            Err(_) => return 0,
        };
        for signal in &signals {
            signal();
        }
        signals.len()
    }

    /// Number of callbacks currently scheduled
    pub fn active(&self) -> usize {
        self.slots.lock().map(|s| s.active.len()).unwrap_or(0)
    }
}

impl Scheduler for ManualScheduler {
    fn every(&self, _period: Duration, on_tick: TickSignal) -> TickHandle {
        let id = match self.slots.lock() {
            Ok(mut slots) => {
                let id = slots.next_id;
                slots.next_id += 1;
                slots.active.push((id, on_tick));
                id
            }
            Err(_) => return TickHandle::new(|| {}),
        };

        let slots = Arc::clone(&self.slots);
        TickHandle::new(move || {
            if let Ok(mut slots) = slots.lock() {
                slots.active.retain(|(slot, _)| *slot != id);
            }
        })
    }
}
