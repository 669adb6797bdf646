//! Local document storage
//!
//! Every piece of durable state (timer snapshot, settings, completed stats,
//! task list, analytics counters) is an independent JSON document stored
//! under a string key. The [`StoragePort`] trait is the seam between the
//! domain code and the medium, so tests run against [`MemoryStore`].

pub mod file_store;
pub mod memory;
pub mod timer_store;

pub use file_store::FileStore;
pub use memory::MemoryStore;
pub use timer_store::TimerStore;

use thiserror::Error;

/// Storage key for the timer snapshot
pub const SNAPSHOT_KEY: &str = "pomodoro-stats";
/// Storage key for the timer settings
pub const SETTINGS_KEY: &str = "pomodoro-settings";
/// Storage key for the completed-session accumulators
pub const COMPLETED_KEY: &str = "pomodoro-completed";
/// Storage key for the task list
pub const TASKS_KEY: &str = "pomodoro-tasks";
/// Storage key for the rolling visit window
pub const LAST_VISIT_KEY: &str = "last_visit_timestamp";
/// Storage key for the analytics counters
pub const ANALYTICS_KEY: &str = "analytics-counters";

/// Errors raised by a storage backend
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed for '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("storage quota exceeded writing '{key}' ({size} bytes)")]
    QuotaExceeded { key: String, size: usize },

    #[error("failed to serialize '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Key/value port over durable local storage.
///
/// Values are opaque strings (JSON text in practice). Writes overwrite.
pub trait StoragePort: Send + Sync {
    /// Read the raw document stored under `key`, if any
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrite the document stored under `key`
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove the document stored under `key`; missing keys are not an error
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Serialize `value` and store it under `key`
pub fn write_json<T: serde::Serialize>(
    storage: &dyn StoragePort,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let text = serde_json::to_string(value).map_err(|source| StorageError::Serialize {
        key: key.to_string(),
        source,
    })?;
    storage.set(key, &text)
}

/// Read the document under `key` and parse it as loose JSON.
///
/// Missing documents, read failures and corrupt JSON all come back as
/// `None`; callers fall back to defaults.
pub fn read_json_value(storage: &dyn StoragePort, key: &str) -> Option<serde_json::Value> {
    let raw = match storage.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!("Failed to read '{}': {}", key, e);
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Ignoring corrupt document '{}': {}", key, e);
            None
        }
    }
}
