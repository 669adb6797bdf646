//! State management module
//!
//! This module contains the timer state types, settings, completed-session
//! accumulators and the shared application state.

pub mod app_state;
pub mod completed;
pub mod settings;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use completed::CompletedStats;
pub use settings::{Settings, SettingsPatch};
pub use timer_state::{DurableTimer, RunState, SessionType, TimerSnapshot};
