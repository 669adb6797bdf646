//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};
use clap::Parser;

/// CLI argument parsing structure
#[derive(Parser, Debug, Clone)]
#[command(name = "focus-timer")]
#[command(about = "A drift-resistant Pomodoro timer and task list served over HTTP")]
#[command(version = "1.0.0")]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Directory holding the persisted documents
    #[arg(short, long, default_value = "./focus-timer-data")]
    pub data_dir: PathBuf,

    /// Secret required by the analytics reset endpoint
    #[arg(long, env = "FOCUS_TIMER_RESET_KEY")]
    pub reset_key: Option<String>,

    /// Seconds between host suspend/resume checks
    #[arg(long, default_value = "15")]
    pub wake_check_secs: u64,

    /// Disable the completion chime
    #[arg(long)]
    pub silent: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn wake_check_interval(&self) -> Duration {
        Duration::from_secs(self.wake_check_secs.max(1))
    }
}
