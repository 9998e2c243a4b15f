#![deny(missing_docs)]
//! Shared logging utilities for the vidjob workspace.
//!
//! This crate provides the `engine_*` logging macros used across the codebase,
//! a helper that keeps bearer tokens out of log files, and a minimal test
//! initializer for the global logger.

/// Number of leading token characters kept by [`redact`].
const REDACT_PREFIX: usize = 6;

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! engine_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! engine_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! engine_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! engine_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! engine_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Returns a log-safe rendering of an authentication token.
///
/// Only a short prefix and the total length survive, e.g. `eyJhbG…(143)`.
/// Tokens no longer than the prefix are hidden entirely.
pub fn redact(token: &str) -> String {
    let len = token.chars().count();
    if len <= REDACT_PREFIX {
        return format!("…({len})");
    }
    let prefix: String = token.chars().take(REDACT_PREFIX).collect();
    format!("{prefix}…({len})")
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
