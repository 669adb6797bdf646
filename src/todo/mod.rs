//! Task and subtask manager

pub mod list;
pub mod model;
pub mod store;

pub use list::TaskList;
pub use model::{Priority, Subtask, Task, TaskDocument};
pub use store::TaskStore;

use thiserror::Error;

use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum TodoError {
    #[error("task '{0}' not found")]
    TaskNotFound(String),

    #[error("subtask '{subtask}' not found in task '{task}'")]
    SubtaskNotFound { task: String, subtask: String },

    #[error("index {index} out of range for {len} items")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("invalid priority {0}, expected one of 1, 2, 3, 4, 6, 9")]
    InvalidPriority(u8),

    #[error("Failed to save tasks: {0}")]
    Storage(#[from] StorageError),
}
