//! # trial-log
//!
//! `tracing-subscriber` setup shared by the trial crates and their tests.
//!
//! ```rust,no_run
//! fn main() -> trial_log::LogResult<()> {
//!     trial_log::auto_init()?;
//!     tracing::info!(port = 8080, "server starting");
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]

mod builder;
mod config;

use std::sync::OnceLock;

pub use builder::LoggerBuilder;
pub use config::{Config, FORMAT_ENV, Format, LEVEL_ENV};

/// Result type for logger operations
pub type LogResult<T> = Result<T, LogError>;

/// Error type for logger operations
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// Filter parsing error
    #[error("Invalid filter: {0}")]
    Filter(String),

    /// A global subscriber could not be installed
    #[error("Failed to install subscriber: {0}")]
    Init(String),
}

static TEST_INIT: OnceLock<()> = OnceLock::new();

/// Picks a configuration from the environment and initializes the logger.
///
/// `TRIAL_LOG` / `RUST_LOG` select [`Config::from_env`]; otherwise debug
/// builds get [`Config::development`] and release builds the default.
pub fn auto_init() -> LogResult<()> {
    if std::env::var(LEVEL_ENV).is_ok() || std::env::var("RUST_LOG").is_ok() {
        init_with(Config::from_env())
    } else if cfg!(debug_assertions) {
        init_with(Config::development())
    } else {
        init()
    }
}

/// Initialize with default configuration
pub fn init() -> LogResult<()> {
    init_with(Config::default())
}

/// Initialize with custom configuration
pub fn init_with(config: Config) -> LogResult<()> {
    LoggerBuilder::from_config(config).build()
}

/// Initialize for tests. Safe to call from every test; only the first call
/// in a process installs anything, and an already installed subscriber is
/// left alone.
pub fn init_test() {
    TEST_INIT.get_or_init(|| {
        if tracing::dispatcher::has_been_set() {
            return;
        }
        if let Err(e) = init_with(Config::test()) {
            eprintln!("trial-log: test logging disabled: {e}");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_test_is_idempotent() {
        init_test();
        init_test();
        assert!(tracing::dispatcher::has_been_set());
    }
}
