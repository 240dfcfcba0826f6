use std::sync::atomic::{AtomicBool, Ordering};

/// Macro for prefixed status logging to stderr (only when stderr is a terminal).
///
/// Usage:
/// ```ignore
/// log_status!("sweep", "Checking {} probes", count);
/// log_status!("fix", "Removed stale lock file {}", path.display());
/// ```
#[macro_export]
macro_rules! log_status {
    ($prefix:expr, $($arg:tt)*) => {
        if ::std::io::IsTerminal::is_terminal(&::std::io::stderr()) {
            eprintln!(concat!("[", $prefix, "] {}"), format_args!($($arg)*));
        }
    };
}

/// Prefixed diagnostic logging to stderr, emitted only after `set_verbose(true)`.
///
/// Unlike `log_status!` this is not tied to a terminal: verbose output is an
/// explicit opt-in and is expected to be captured by cron wrappers.
#[macro_export]
macro_rules! log_verbose {
    ($prefix:expr, $($arg:tt)*) => {
        if $crate::is_verbose() {
            eprintln!(concat!("[", $prefix, "] {}"), format_args!($($arg)*));
        }
    };
}

static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Enable or disable `log_verbose!` output for the whole process.
pub fn set_verbose(enabled: bool) {
    VERBOSE.store(enabled, Ordering::Relaxed);
}

pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

pub mod core;
pub mod utils;

// Re-export everything from core for ergonomic library use
// Users can write `aether_sweep::report` instead of `aether_sweep::core::report`
pub use core::*;
