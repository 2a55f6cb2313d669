//! Logging bootstrap
//!
//! Centralised tracing initialisation so embedding applications (and the
//! set-top UI in particular) control what reaches stderr.

use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Logging mode for different embeddings
#[derive(Debug, Clone, Copy)]
pub enum LoggingMode {
    /// No output; the UI owns the terminal.
    Silent,
    /// Compact stderr output for development.
    Development,
    /// Verbose diagnostics with source locations.
    Debug,
}

/// Logging configuration error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("failed to initialize tracing subscriber: {0}")]
    TracingInit(String),
}

/// Initialize logging with the given mode.
///
/// Call once, early, before constructing the Navigation facade.
///
/// # Environment variables
///
/// - `NAV_LOG_LEVEL`: override the log level (error, warn, info, debug, trace)
/// - `RUST_LOG`: honoured when `NAV_LOG_LEVEL` is unset
///
/// # Errors
///
/// Returns an error when a global subscriber is already installed.
pub fn init_logging(mode: LoggingMode) -> Result<(), LoggingError> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    match mode {
        LoggingMode::Silent => Ok(()),
        LoggingMode::Development => {
            let subscriber = Registry::default()
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_thread_ids(false)
                        .with_file(false)
                        .with_line_number(false)
                        .compact(),
                )
                .with(env_filter("info"));

            subscriber
                .try_init()
                .map_err(|e| LoggingError::TracingInit(e.to_string()))
        }
        LoggingMode::Debug => {
            let subscriber = Registry::default()
                .with(
                    fmt::layer()
                        .pretty()
                        .with_thread_ids(true)
                        .with_file(true)
                        .with_line_number(true),
                )
                .with(env_filter("debug"));

            subscriber
                .try_init()
                .map_err(|e| LoggingError::TracingInit(e.to_string()))
        }
    }
}

/// Initialize from `NAV_LOG_MODE` (silent/development/debug); defaults to
/// silent so the UI stays clean.
///
/// # Errors
///
/// Same conditions as [`init_logging`].
pub fn init_logging_from_env() -> Result<(), LoggingError> {
    let mode = match std::env::var("NAV_LOG_MODE").as_deref() {
        Ok("development") => LoggingMode::Development,
        Ok("debug") => LoggingMode::Debug,
        _ => LoggingMode::Silent,
    };
    init_logging(mode)
}

/// Whether a global subscriber has already been installed.
pub fn is_initialized() -> bool {
    tracing::dispatcher::has_been_set()
}

fn env_filter(default_level: &str) -> EnvFilter {
    if let Ok(level) = std::env::var("NAV_LOG_LEVEL") {
        EnvFilter::new(level)
    } else if let Ok(rust_log) = std::env::var("RUST_LOG") {
        EnvFilter::new(rust_log)
    } else {
        EnvFilter::new(default_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silent_mode_never_fails() {
        assert!(init_logging(LoggingMode::Silent).is_ok());
    }
}
