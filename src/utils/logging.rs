//! Logging utilities for table_forge

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Initialize tracing based on configuration.
///
/// Verbose mode only adds diagnostic output; it never changes control flow.
pub fn init_logging(config: &Option<LoggingConfig>, verbose: bool) {
    let level = match config {
        Some(config) => config.level.clone(),
        None if verbose => "debug".to_string(),
        None => "info".to_string(),
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("table_forge={}", level)));

    // Ignore the error if a subscriber is already installed (tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}
