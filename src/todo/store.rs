//! Task list persistence

use std::sync::Arc;
use tracing::warn;

use super::model::{Task, TaskDocument};
use crate::storage::{read_json_value, write_json, StorageError, StoragePort, TASKS_KEY};

/// Reads and writes the `{ tasks, lastModified }` document.
///
/// Unlike the timer documents, a failed save is returned to the caller.
#[derive(Clone)]
pub struct TaskStore {
    storage: Arc<dyn StoragePort>,
}

impl TaskStore {
    pub fn new(storage: Arc<dyn StoragePort>) -> Self {
        Self { storage }
    }

    /// Stored tasks; corrupt or missing documents load as an empty list
    pub fn load(&self) -> TaskDocument {
        let empty = TaskDocument { tasks: Vec::new(), last_modified: None };
        let Some(value) = read_json_value(self.storage.as_ref(), TASKS_KEY) else {
            return empty;
        };

        match serde_json::from_value(value) {
            Ok(doc) => doc,
            Err(e) => {
                warn!("Failed to load tasks: {}", e);
                empty
            }
        }
    }

    pub fn save(&self, tasks: &[Task], now_ms: i64) -> Result<(), StorageError> {
        let doc = TaskDocument {
            tasks: tasks.to_vec(),
            last_modified: Some(now_ms),
        };
        write_json(self.storage.as_ref(), TASKS_KEY, &doc)
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove(TASKS_KEY)
    }
}
