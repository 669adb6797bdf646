//! Countdown engine and its collaborators
//!
//! The engine is driven by two asynchronous inputs, scheduled ticks and
//! foreground-regained events, both delivered as [`TimerEvent`]s.

pub mod chime;
pub mod clock;
pub mod engine;
pub mod notifier;
pub mod policy;
pub mod reconciler;
pub mod scheduler;

pub use chime::{Chime, SilentChime, TerminalBell};
pub use clock::{Clock, FakeClock, SystemClock};
pub use engine::{Completion, EngineDeps, TickOutcome, TimerEngine};
pub use notifier::{CompletionNotifier, NoopNotifier};
pub use policy::SessionKind;
pub use reconciler::{reconcile_on_foreground, Reconciliation};
pub use scheduler::{ManualScheduler, Scheduler, TickHandle, TickSignal, TokioScheduler};

/// Asynchronous input to the timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Scheduled one-second tick
    Tick,
    /// The client or host came back to the foreground
    Foreground,
}
