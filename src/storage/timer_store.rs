//! Timer persistence: snapshot, settings and completed stats
//!
//! Loads never fail. Each field is validated on its own and falls back to
//! its default when missing or malformed; corrupt documents behave like
//! missing ones. The run flags of a snapshot are never restored.

use std::sync::Arc;

use serde_json::{Map, Value};

use super::{
    read_json_value, write_json, StorageError, StoragePort, COMPLETED_KEY, SETTINGS_KEY,
    SNAPSHOT_KEY,
};
use crate::state::{
    settings::{MinuteBounds, FOCUS_BOUNDS, LONG_BREAK_BOUNDS, SHORT_BREAK_BOUNDS},
    CompletedStats, SessionType, Settings, TimerSnapshot,
};

/// Timer-specific persistence adapter over a [`StoragePort`]
#[derive(Clone)]
pub struct TimerStore {
    storage: Arc<dyn StoragePort>,
}

impl TimerStore {
    pub fn new(storage: Arc<dyn StoragePort>) -> Self {
        Self { storage }
    }

    pub fn save_snapshot(&self, snapshot: &TimerSnapshot) -> Result<(), StorageError> {
        write_json(self.storage.as_ref(), SNAPSHOT_KEY, snapshot)
    }

    /// Load the stored snapshot, defaulting `remainingSeconds` to a full
    /// session of `current_focus_minutes`
    pub fn load_snapshot(&self, current_focus_minutes: u32) -> TimerSnapshot {
        let defaults = TimerSnapshot::fresh(current_focus_minutes);
        let Some(Value::Object(doc)) = read_json_value(self.storage.as_ref(), SNAPSHOT_KEY) else {
            return defaults;
        };

        TimerSnapshot {
            session_type: session_type_field(&doc).unwrap_or(defaults.session_type),
            remaining_seconds: u32_field(&doc, &["remainingSeconds", "timeLeft"])
                .unwrap_or(defaults.remaining_seconds),
            is_running: false,
            is_paused: false,
            committed_focus_duration: u32_field(&doc, &["committedFocusDuration"])
                .filter(|minutes| *minutes > 0),
            session_end_timestamp: None,
        }
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<(), StorageError> {
        write_json(self.storage.as_ref(), SETTINGS_KEY, settings)
    }

    pub fn load_settings(&self) -> Settings {
        let Some(Value::Object(doc)) = read_json_value(self.storage.as_ref(), SETTINGS_KEY) else {
            return Settings::default();
        };

        let field = |name: &str, bounds: &MinuteBounds| {
            doc.get(name)
                .and_then(Value::as_i64)
                .map_or(bounds.default, |v| bounds.clamp(v))
        };

        Settings {
            focus_minutes: field("focusTime", &FOCUS_BOUNDS),
            short_break_minutes: field("shortBreakTime", &SHORT_BREAK_BOUNDS),
            long_break_minutes: field("longBreakTime", &LONG_BREAK_BOUNDS),
        }
    }

    pub fn save_completed(&self, stats: &CompletedStats) -> Result<(), StorageError> {
        write_json(self.storage.as_ref(), COMPLETED_KEY, stats)
    }

    pub fn load_completed(&self) -> CompletedStats {
        let Some(Value::Object(doc)) = read_json_value(self.storage.as_ref(), COMPLETED_KEY) else {
            return CompletedStats::default();
        };

        CompletedStats {
            completed_pomodoros: u32_field(&doc, &["completedPomodoros"]).unwrap_or(0),
            total_focus_minutes: u32_field(&doc, &["totalFocusMinutes"]).unwrap_or(0),
        }
    }
}

/// First key in `names` holding a non-negative integer that fits in u32
fn u32_field(doc: &Map<String, Value>, names: &[&str]) -> Option<u32> {
    names
        .iter()
        .find_map(|name| doc.get(*name))
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
}

/// Session type, also accepting the older boolean `isFocusSession` form
fn session_type_field(doc: &Map<String, Value>) -> Option<SessionType> {
    if let Some(value) = doc.get("sessionType") {
        return serde_json::from_value(value.clone()).ok();
    }
    doc.get("isFocusSession")
        .and_then(Value::as_bool)
        .map(|focus| if focus { SessionType::Focus } else { SessionType::Break })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use serde_json::json;

    fn store_with(key: &str, value: &str) -> TimerStore {
        let storage = MemoryStore::new();
        storage.set(key, value).unwrap();
        TimerStore::new(Arc::new(storage))
    }

    #[test]
    fn load_without_data_uses_current_focus_length() {
        let store = TimerStore::new(Arc::new(MemoryStore::new()));
        let snapshot = store.load_snapshot(40);

        assert_eq!(snapshot.session_type, SessionType::Focus);
        assert_eq!(snapshot.remaining_seconds, 2400);
        assert_eq!(snapshot.committed_focus_duration, None);
    }

    #[test]
    fn round_trip_keeps_durable_fields_and_drops_run_flags() {
        let store = TimerStore::new(Arc::new(MemoryStore::new()));
        let saved = TimerSnapshot {
            session_type: SessionType::Break,
            remaining_seconds: 123,
            is_running: true,
            is_paused: true,
            committed_focus_duration: Some(50),
            session_end_timestamp: Some(1_700_000_000_000),
        };
        store.save_snapshot(&saved).unwrap();

        let loaded = store.load_snapshot(25);
        assert_eq!(loaded.session_type, SessionType::Break);
        assert_eq!(loaded.remaining_seconds, 123);
        assert_eq!(loaded.committed_focus_duration, Some(50));
        assert!(!loaded.is_running);
        assert!(!loaded.is_paused);
        assert_eq!(loaded.session_end_timestamp, None);
    }

    #[test]
    fn corrupt_snapshot_yields_defaults() {
        let store = store_with(SNAPSHOT_KEY, "{not json");
        assert_eq!(store.load_snapshot(25), TimerSnapshot::fresh(25));

        let store = store_with(SNAPSHOT_KEY, "[1,2,3]");
        assert_eq!(store.load_snapshot(10), TimerSnapshot::fresh(10));
    }

    #[test]
    fn invalid_fields_default_individually() {
        let doc = json!({
            "sessionType": "nap",
            "remainingSeconds": -4,
            "committedFocusDuration": "soon",
        });
        let store = store_with(SNAPSHOT_KEY, &doc.to_string());
        let loaded = store.load_snapshot(30);

        assert_eq!(loaded.session_type, SessionType::Focus);
        assert_eq!(loaded.remaining_seconds, 1800);
        assert_eq!(loaded.committed_focus_duration, None);
    }

    #[test]
    fn legacy_snapshot_fields_are_understood() {
        let doc = json!({ "isFocusSession": false, "timeLeft": 240, "sessionCount": 3 });
        let store = store_with(SNAPSHOT_KEY, &doc.to_string());
        let loaded = store.load_snapshot(25);

        assert_eq!(loaded.session_type, SessionType::Break);
        assert_eq!(loaded.remaining_seconds, 240);
    }

    #[test]
    fn settings_are_clamped_on_load() {
        let doc = json!({ "focusTime": 500, "shortBreakTime": "x" });
        let store = store_with(SETTINGS_KEY, &doc.to_string());

        assert_eq!(store.load_settings(), Settings::new(90, 5, 30));
    }

    #[test]
    fn completed_round_trip() {
        let store = TimerStore::new(Arc::new(MemoryStore::new()));
        assert_eq!(store.load_completed(), CompletedStats::default());

        let stats = CompletedStats { completed_pomodoros: 7, total_focus_minutes: 175 };
        store.save_completed(&stats).unwrap();
        assert_eq!(store.load_completed(), stats);
    }

    #[test]
    fn quota_failure_is_reported_to_caller() {
        let store = TimerStore::new(Arc::new(MemoryStore::with_quota(4)));
        let err = store.save_snapshot(&TimerSnapshot::fresh(25)).unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { .. }));
    }
}
