//! Session policy: break selection, session totals and progress
//!
//! All functions here are pure.

use serde::{Deserialize, Serialize};

use crate::state::{SessionType, Settings};

/// Number of focus sessions in one set; the break after the last is long
pub const SESSIONS_PER_SET: u32 = 4;

/// Session type with the break length resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionKind {
    Focus,
    ShortBreak,
    LongBreak,
}

impl SessionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKind::Focus => "focus",
            SessionKind::ShortBreak => "short break",
            SessionKind::LongBreak => "long break",
        }
    }
}

/// Break that follows `completed` focus sessions.
///
/// Zero completed sessions is always a short break even though 0 % 4 == 0.
pub fn break_kind(completed: u32) -> SessionKind {
    if completed > 0 && completed % SESSIONS_PER_SET == 0 {
        SessionKind::LongBreak
    } else {
        SessionKind::ShortBreak
    }
}

/// Resolve a stored session type into its kind
pub fn session_kind(session: SessionType, completed: u32) -> SessionKind {
    match session {
        SessionType::Focus => SessionKind::Focus,
        SessionType::Break => break_kind(completed),
    }
}

/// Full length of the session in seconds.
///
/// Focus prefers the committed length over the live setting so a mid-session
/// settings edit does not distort progress. Breaks always use live settings.
pub fn total_session_seconds(
    session: SessionType,
    settings: &Settings,
    committed_focus_minutes: Option<u32>,
    completed: u32,
) -> u32 {
    let minutes = match session_kind(session, completed) {
        SessionKind::Focus => committed_focus_minutes.unwrap_or(settings.focus_minutes),
        SessionKind::ShortBreak => settings.short_break_minutes,
        SessionKind::LongBreak => settings.long_break_minutes,
    };
    minutes.saturating_mul(60)
}

/// Percent of the focus session elapsed; always 0 for breaks
pub fn progress_percent(session: SessionType, remaining_seconds: u32, total_seconds: u32) -> f64 {
    if session == SessionType::Break || total_seconds == 0 {
        return 0.0;
    }
    let elapsed = total_seconds.saturating_sub(remaining_seconds);
    f64::from(elapsed) / f64::from(total_seconds) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_break_every_fourth_session() {
        for completed in 0..=40 {
            let expected = if completed > 0 && completed % 4 == 0 {
                SessionKind::LongBreak
            } else {
                SessionKind::ShortBreak
            };
            assert_eq!(break_kind(completed), expected, "completed = {}", completed);
        }
    }

    #[test]
    fn zero_completed_is_short_break() {
        assert_eq!(break_kind(0), SessionKind::ShortBreak);
    }

    #[test]
    fn focus_total_prefers_committed_length() {
        let settings = Settings::new(10, 5, 30);
        assert_eq!(total_session_seconds(SessionType::Focus, &settings, Some(1), 0), 60);
        assert_eq!(total_session_seconds(SessionType::Focus, &settings, None, 0), 600);
    }

    #[test]
    fn break_total_follows_policy() {
        let settings = Settings::new(25, 5, 30);
        assert_eq!(total_session_seconds(SessionType::Break, &settings, Some(99), 3), 300);
        assert_eq!(total_session_seconds(SessionType::Break, &settings, None, 4), 1800);
        assert_eq!(total_session_seconds(SessionType::Break, &settings, None, 0), 300);
    }

    #[test]
    fn progress_is_focus_only() {
        assert_eq!(progress_percent(SessionType::Focus, 30, 60), 50.0);
        assert_eq!(progress_percent(SessionType::Break, 30, 60), 0.0);
        assert_eq!(progress_percent(SessionType::Focus, 0, 0), 0.0);
        assert_eq!(progress_percent(SessionType::Focus, 60, 60), 0.0);
    }
}
