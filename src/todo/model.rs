//! Task and subtask records

use serde::{Deserialize, Serialize};

use super::TodoError;

/// Eisenhower-style priority; only 1, 2, 3, 4, 6 and 9 are valid
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Priority(u8);

impl Priority {
    pub const ALLOWED: [u8; 6] = [1, 2, 3, 4, 6, 9];

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority(2)
    }
}

impl TryFrom<u8> for Priority {
    type Error = TodoError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if Self::ALLOWED.contains(&value) {
            Ok(Priority(value))
        } else {
            Err(TodoError::InvalidPriority(value))
        }
    }
}

impl From<Priority> for u8 {
    fn from(priority: Priority) -> Self {
        priority.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subtask {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub order: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    /// Whether the subtask list is shown
    #[serde(default)]
    pub expanded: bool,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub order: usize,
    #[serde(default)]
    pub priority: Priority,
}

impl Task {
    /// Parent completion rule after a subtask change: complete iff there is
    /// at least one subtask and every subtask is complete
    pub(crate) fn sync_completion_from_subtasks(&mut self) {
        self.completed =
            !self.subtasks.is_empty() && self.subtasks.iter().all(|subtask| subtask.completed);
    }

    pub(crate) fn subtask_mut(&mut self, subtask_id: &str) -> Option<&mut Subtask> {
        self.subtasks.iter_mut().find(|subtask| subtask.id == subtask_id)
    }
}

/// Stored form of the task list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDocument {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub last_modified: Option<i64>,
}
