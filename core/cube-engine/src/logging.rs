//! FILENAME: core/cube-engine/src/logging.rs
// PURPOSE: Category-tagged logging for the cube pipeline.
//
// Messages go through the `log` facade with the category as the target, so the
// hosting service decides where they end up. The crate never installs a logger.

// ============================================================================
// MACRO DEFINITIONS & EXPORTS
// ============================================================================

macro_rules! log_debug {
    ($cat:expr, $($arg:tt)*) => {
        ::log::debug!(target: $cat, $($arg)*)
    };
}

macro_rules! log_info {
    ($cat:expr, $($arg:tt)*) => {
        ::log::info!(target: $cat, $($arg)*)
    };
}

macro_rules! log_warn {
    ($cat:expr, $($arg:tt)*) => {
        ::log::warn!(target: $cat, $($arg)*)
    };
}

// ENTER/EXIT macros for function tracing

macro_rules! log_enter {
    ($cat:expr, $func:expr) => {
        ::log::trace!(target: $cat, "ENTER {}", $func)
    };
    ($cat:expr, $func:expr, $($arg:tt)*) => {
        ::log::trace!(target: $cat, "ENTER {} {}", $func, format!($($arg)*))
    };
}

macro_rules! log_exit {
    ($cat:expr, $func:expr) => {
        ::log::trace!(target: $cat, "EXIT {}", $func)
    };
    ($cat:expr, $func:expr, $($arg:tt)*) => {
        ::log::trace!(target: $cat, "EXIT {} {}", $func, format!($($arg)*))
    };
}

// Re-export the macros so they can be imported via `use crate::logging::log_info;`
pub(crate) use log_debug;
pub(crate) use log_enter;
pub(crate) use log_exit;
pub(crate) use log_info;
pub(crate) use log_warn;

/// Log target for the transformation pipeline.
pub(crate) const CUBE: &str = "CUBE";
