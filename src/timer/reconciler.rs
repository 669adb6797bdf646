//! Foreground/wake reconciliation
//!
//! While the host is suspended (or a client tab is backgrounded) scheduled
//! ticks stop or lag badly. When the foreground comes back the countdown is
//! recomputed at once instead of waiting for the next tick, and a session
//! that ended in the meantime completes now.

use serde::Serialize;
use tracing::{debug, info};

use super::engine::{Completion, TimerEngine};

/// What a foreground-regained event did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Reconciliation {
    /// Timer was not running
    Idle,
    /// Remaining time brought up to date
    Updated { remaining_seconds: u32 },
    /// The session had already run out
    Completed { completion: Completion },
}

/// Handle a foreground-regained event
pub fn reconcile_on_foreground(engine: &mut TimerEngine) -> Reconciliation {
    let Some(outcome) = engine.recompute() else {
        debug!("Foreground regained while {}; nothing to reconcile", engine.run_state().as_str());
        return Reconciliation::Idle;
    };

    match outcome.completion {
        Some(completion) => {
            info!(
                "Session ended while in background; {} complete",
                completion.finished.as_str()
            );
            Reconciliation::Completed { completion }
        }
        None => {
            debug!("Reconciled remaining time: {}s", outcome.remaining_seconds);
            Reconciliation::Updated {
                remaining_seconds: outcome.remaining_seconds,
            }
        }
    }
}
