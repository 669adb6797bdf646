//! Read-only views derived from the timer state
//!
//! Nothing here owns state; everything is recomputed from the engine on
//! demand.

use serde::Serialize;

use crate::{
    state::{CompletedStats, RunState, Settings, TimerSnapshot},
    timer::{
        policy::{SessionKind, SESSIONS_PER_SET},
        TimerEngine,
    },
};

/// Fill state of one unit of the 4-unit set indicator
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "state", content = "fraction", rename_all = "lowercase")]
pub enum UnitFill {
    Empty,
    /// Fraction in `0.0..=1.0` of the in-flight focus session
    Partial(f64),
    Full,
}

/// Progress ring and per-set indicator
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RingView {
    pub percent: f64,
    pub units: [UnitFill; SESSIONS_PER_SET as usize],
}

impl RingView {
    /// Derive the ring from session kind, run state and counters.
    ///
    /// Completed units are `completed mod 4`, except during a long break
    /// where the finished set shows all four. Only an in-flight focus
    /// session (running or paused) shows a partial unit.
    pub fn derive(kind: SessionKind, run: RunState, completed: u32, percent: f64) -> Self {
        let filled = if kind == SessionKind::LongBreak {
            SESSIONS_PER_SET
        } else {
            completed % SESSIONS_PER_SET
        };

        let in_flight = kind == SessionKind::Focus && run != RunState::Stopped;
        let mut units = [UnitFill::Empty; SESSIONS_PER_SET as usize];
        for (index, unit) in (0u32..).zip(units.iter_mut()) {
            if index < filled {
                *unit = UnitFill::Full;
            } else if index == filled && in_flight {
                *unit = UnitFill::Partial((percent / 100.0).clamp(0.0, 1.0));
            }
        }

        Self { percent, units }
    }

    pub fn for_engine(engine: &TimerEngine) -> Self {
        Self::derive(
            engine.session_kind(),
            engine.run_state(),
            engine.stats().completed_pomodoros,
            engine.progress_percent(),
        )
    }

    pub fn filled_units(&self) -> usize {
        self.units.iter().filter(|u| **u == UnitFill::Full).count()
    }
}

/// Format seconds as `MM:SS`
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Format minutes as `Xh Ym`, dropping the hours when zero
pub fn format_focus_time(total_minutes: u32) -> String {
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

/// Completed-sessions panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedSummary {
    pub pomodoros: u32,
    pub sets: u32,
    pub total_focus_minutes: u32,
    pub focus_time: String,
}

impl CompletedSummary {
    pub fn from_stats(stats: &CompletedStats) -> Self {
        Self {
            pomodoros: stats.completed_pomodoros,
            sets: stats.completed_pomodoros / SESSIONS_PER_SET,
            total_focus_minutes: stats.total_focus_minutes,
            focus_time: format_focus_time(stats.total_focus_minutes),
        }
    }
}

/// Everything a client needs to draw the timer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerView {
    pub snapshot: TimerSnapshot,
    pub session: SessionKind,
    pub run_state: &'static str,
    pub clock: String,
    pub total_seconds: u32,
    pub ring: RingView,
    pub completed: CompletedSummary,
    pub settings: Settings,
}

impl TimerView {
    pub fn from_engine(engine: &TimerEngine) -> Self {
        Self {
            snapshot: engine.snapshot(),
            session: engine.session_kind(),
            run_state: engine.run_state().as_str(),
            clock: format_clock(engine.remaining_seconds()),
            total_seconds: engine.total_seconds(),
            ring: RingView::for_engine(engine),
            completed: CompletedSummary::from_stats(&engine.stats()),
            settings: engine.settings(),
        }
    }
}
