//! Cross-session accumulators

use serde::{Deserialize, Serialize};

/// Totals over all completed focus sessions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedStats {
    pub completed_pomodoros: u32,
    /// Sum of each completed session's committed length, in minutes
    pub total_focus_minutes: u32,
}

impl CompletedStats {
    /// Record one completed focus session of `minutes`
    pub fn record(&mut self, minutes: u32) {
        self.completed_pomodoros = self.completed_pomodoros.saturating_add(1);
        self.total_focus_minutes = self.total_focus_minutes.saturating_add(minutes);
    }
}
