//! Application-level errors surfaced by [`crate::state::AppState`]

use thiserror::Error;

use crate::{analytics::AnalyticsError, todo::TodoError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to lock {0}")]
    LockPoisoned(&'static str),

    #[error(transparent)]
    Todo(#[from] TodoError),

    #[error(transparent)]
    Analytics(#[from] AnalyticsError),
}
