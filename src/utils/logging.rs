//! Logging macros that can be switched off per module.
//!
//! A module opts in by declaring `const ENABLE_LOGS: bool` and importing the
//! macros from the crate root:
//!
//! ```ignore
//! const ENABLE_LOGS: bool = true;
//!
//! use crate::{log_debug, log_info};
//!
//! log_info!("generated {} questions", count);
//! ```
//!
//! With the flag set to `false` the calls compile to nothing, which keeps the
//! generator and the mastery writer quiet in hosts that log to a small ring
//! buffer.

/// `log::debug!` behind the calling module's `ENABLE_LOGS` flag.
///
/// Used for per-question detail: skipped words, requeued answers, rows
/// touched by a mastery write.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::debug!($($arg)*);
        }
    };
}

/// `log::info!` behind the calling module's `ENABLE_LOGS` flag.
///
/// Used for session-level summaries such as generation results.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!($($arg)*);
        }
    };
}

/// `log::warn!` behind the calling module's `ENABLE_LOGS` flag.
///
/// Used for recoverable trouble: a retried write, a write that matched no
/// rows, a settings file that could not be parsed.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!($($arg)*);
        }
    };
}

/// `log::error!` behind the calling module's `ENABLE_LOGS` flag.
///
/// Errors are gated too; a module that disables logging is expected to
/// surface failures some other way.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::error!($($arg)*);
        }
    };
}
