//! Focus Timer - A drift-resistant Pomodoro timer served over HTTP
//!
//! The countdown is always derived from an absolute deadline, so late or
//! missing ticks, suspended hosts and restarts never make it drift. A small
//! task list and anonymous usage counters ride along.

pub mod analytics;
pub mod api;
pub mod config;
pub mod error;
pub mod presentation;
pub mod state;
pub mod storage;
pub mod tasks;
pub mod timer;
pub mod todo;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use error::AppError;
pub use state::AppState;
pub use utils::signals::shutdown_signal;
