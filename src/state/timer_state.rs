//! Timer state structures
//!
//! The engine keeps two halves of its state apart: [`DurableTimer`] survives
//! a restart, [`RunState`] never does. [`TimerSnapshot`] is the flat wire
//! form written to storage and returned by the API.

use serde::{Deserialize, Serialize};

/// Kind of session as persisted; the break length is derived, not stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    Focus,
    Break,
}

impl SessionType {
    /// The other session type (Focus <-> Break)
    pub fn toggled(self) -> Self {
        match self {
            SessionType::Focus => SessionType::Break,
            SessionType::Break => SessionType::Focus,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionType::Focus => "focus",
            SessionType::Break => "break",
        }
    }
}

/// Session-local run state; never restored from storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// At a fresh boundary; settings changes resync the remaining time
    Stopped,
    /// Counting down towards an absolute wall-clock deadline
    Running { ends_at_ms: i64 },
    /// Explicitly paused mid-countdown
    Paused,
}

impl RunState {
    pub fn is_running(&self) -> bool {
        matches!(self, RunState::Running { .. })
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, RunState::Paused)
    }

    pub fn ends_at_ms(&self) -> Option<i64> {
        match self {
            RunState::Running { ends_at_ms } => Some(*ends_at_ms),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Stopped => "stopped",
            RunState::Running { .. } => "running",
            RunState::Paused => "paused",
        }
    }
}

/// The part of the timer that is carried across restarts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurableTimer {
    pub session: SessionType,
    pub remaining_seconds: u32,
    /// Focus length (minutes) locked in when the current focus session started
    pub committed_focus_minutes: Option<u32>,
}

impl DurableTimer {
    /// A fresh focus session of `focus_minutes`
    pub fn fresh(focus_minutes: u32) -> Self {
        Self {
            session: SessionType::Focus,
            remaining_seconds: focus_minutes * 60,
            committed_focus_minutes: None,
        }
    }

    /// Rebuild the durable half from a stored snapshot, ignoring the run flags
    pub fn from_snapshot(snapshot: &TimerSnapshot) -> Self {
        Self {
            session: snapshot.session_type,
            remaining_seconds: snapshot.remaining_seconds,
            committed_focus_minutes: snapshot.committed_focus_duration,
        }
    }
}

/// Persisted/restorable timer state in its wire form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub session_type: SessionType,
    pub remaining_seconds: u32,
    pub is_running: bool,
    pub is_paused: bool,
    pub committed_focus_duration: Option<u32>,
    pub session_end_timestamp: Option<i64>,
}

impl TimerSnapshot {
    /// Combine both halves into the flat form
    pub fn from_parts(timer: &DurableTimer, run: RunState) -> Self {
        Self {
            session_type: timer.session,
            remaining_seconds: timer.remaining_seconds,
            is_running: run.is_running(),
            is_paused: run.is_paused(),
            committed_focus_duration: timer.committed_focus_minutes,
            session_end_timestamp: run.ends_at_ms(),
        }
    }

    /// Default snapshot for a first load
    pub fn fresh(focus_minutes: u32) -> Self {
        Self::from_parts(&DurableTimer::fresh(focus_minutes), RunState::Stopped)
    }
}
