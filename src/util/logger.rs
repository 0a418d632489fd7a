//

use std::io;
use std::str::FromStr;

use tracing::Level;

pub const LEVEL_ENV: &str = "LOG_LEVEL";

/// Diagnostics go to stderr so stdout only carries the sum and debug lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfig {
    pub level: String,
}

impl LoggerConfig {
    /// Reads `LOG_LEVEL`, defaulting to `warn`.
    pub fn from_env() -> Self {
        let level = std::env::var(LEVEL_ENV).unwrap_or_else(|_| "warn".to_string());
        Self { level }
    }

    pub fn level(&self) -> Level {
        Level::from_str(&self.level).unwrap_or(Level::WARN)
    }

    pub fn init(&self) {
        let _ = tracing_subscriber::fmt()
            .with_max_level(self.level())
            .with_writer(io::stderr)
            .with_thread_names(true)
            .try_init();
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}
