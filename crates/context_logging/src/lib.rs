#![deny(missing_docs)]
//! Shared logging utilities for the tool3rd workspace.
//!
//! Every execution context (UI, orchestrator, compute worker) runs on its own
//! thread. This crate keeps the name of the context owning the current thread
//! and provides the `ctx_*` logging macros, which prefix each record with that
//! name so interleaved output from the three event loops stays readable.

use std::cell::Cell;

/// Label used on threads that never called [`set_context`].
pub const UNNAMED_CONTEXT: &str = "-";

thread_local! {
    /// Thread-local storage for the execution context owning this thread.
    static CONTEXT: Cell<&'static str> = const { Cell::new(UNNAMED_CONTEXT) };
}

/// Names the execution context that owns the current thread.
/// Called once by each context loop before it starts processing messages.
pub fn set_context(name: &'static str) {
    CONTEXT.with(|v| v.set(name));
}

/// Returns the execution context name of the current thread,
/// or [`UNNAMED_CONTEXT`] if none was set.
pub fn current_context() -> &'static str {
    CONTEXT.with(|v| v.get())
}

/// Logs a trace-level message tagged with the current context.
#[macro_export]
macro_rules! ctx_trace {
    ($($arg:tt)*) => {{
        log::trace!("[{}] {}", $crate::current_context(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message tagged with the current context.
#[macro_export]
macro_rules! ctx_debug {
    ($($arg:tt)*) => {{
        log::debug!("[{}] {}", $crate::current_context(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message tagged with the current context.
#[macro_export]
macro_rules! ctx_info {
    ($($arg:tt)*) => {{
        log::info!("[{}] {}", $crate::current_context(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message tagged with the current context.
#[macro_export]
macro_rules! ctx_warn {
    ($($arg:tt)*) => {{
        log::warn!("[{}] {}", $crate::current_context(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message tagged with the current context.
#[macro_export]
macro_rules! ctx_error {
    ($($arg:tt)*) => {{
        log::error!("[{}] {}", $crate::current_context(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in tests.
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
