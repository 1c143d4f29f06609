//! Structured logging shared by the tabular workspace
//!
//! Every crate logs through the `emit` macros re-exported here, so one
//! environment variable controls the whole process.
//!
//! Usage:
//! - Set TABULAR_LOG=off (default) - no logs
//! - Set TABULAR_LOG=warn - dropped fields, flagged groups, stalled sources
//! - Set TABULAR_LOG=info - ingestion progress
//! - Set TABULAR_LOG=debug - per-operation row counts

use std::sync::Once;

// Re-export emit so macros can use it
pub use emit;

/// Environment variable holding the log level
pub const LOG_ENV: &str = "TABULAR_LOG";

static INIT: Once = Once::new();

/// Log level requested through [`LOG_ENV`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSetting {
    Off,
    Level(emit::Level),
    /// Unrecognised value; treated as info
    Unknown,
}

/// Interpret a `TABULAR_LOG` value.
pub fn parse_setting(value: &str) -> LogSetting {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "off" => LogSetting::Off,
        "error" => LogSetting::Level(emit::Level::Error),
        "warn" => LogSetting::Level(emit::Level::Warn),
        "info" => LogSetting::Level(emit::Level::Info),
        "debug" => LogSetting::Level(emit::Level::Debug),
        _ => LogSetting::Unknown,
    }
}

/// Initialize diagnostics based on the TABULAR_LOG environment variable
///
/// Safe to call multiple times; only the first call has any effect.
pub fn init_diagnostics() {
    INIT.call_once(|| {
        let raw = std::env::var(LOG_ENV).unwrap_or_default();

        let level = match parse_setting(&raw) {
            LogSetting::Off => return,
            LogSetting::Level(level) => level,
            LogSetting::Unknown => {
                // Bootstrap warning: the emitter does not exist yet
                eprintln!("Warning: Unknown {LOG_ENV} value '{raw}', using 'info'");
                emit::Level::Info
            }
        };

        let rt = emit::setup()
            .emit_to(emit_term::stderr())
            .emit_when(emit::level::min_filter(level))
            .init();

        // The runtime lives for the rest of the process
        std::mem::forget(rt);
    });
}

/// Detailed diagnostics (row counts, processing steps)
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::emit::debug!($($arg)*)
    };
}

/// Normal operations users may want to see (pages fetched, tables built)
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::emit::info!($($arg)*)
    };
}

/// Recoverable data-quality problems (dropped fields, all-null groups)
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::emit::warn!($($arg)*)
    };
}

/// Failures that stop an operation
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::emit::error!($($arg)*)
    };
}

pub use init_diagnostics as init;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_safe_to_call_multiple_times() {
        init_diagnostics();
        init_diagnostics();
    }

    #[test]
    fn test_parse_setting() {
        assert_eq!(parse_setting(""), LogSetting::Off);
        assert_eq!(parse_setting("off"), LogSetting::Off);
        assert_eq!(parse_setting("DEBUG"), LogSetting::Level(emit::Level::Debug));
        assert_eq!(parse_setting(" warn "), LogSetting::Level(emit::Level::Warn));
        assert_eq!(parse_setting("verbose"), LogSetting::Unknown);
    }

    #[test]
    fn test_macros_compile() {
        info!("Fetched {pages} pages", pages: 3);
        debug!("Filter kept {rows} rows", rows: 2);
        warn!("Dropped field {field}", field: "Notes");
        error!("Source failed");
    }
}
