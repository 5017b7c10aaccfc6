//! Process-wide tracing setup.

/// Subscriber configuration (filters, output format).
pub mod tracing;

pub use crate::tracing::{LogFormat, init_with};

/// Initialize process-wide tracing with JSON output and `RUST_LOG` filtering
/// (default `info`).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    init_with(LogFormat::Json, DEFAULT_DIRECTIVE);
}

/// Filter used when `RUST_LOG` is unset or unparseable.
pub const DEFAULT_DIRECTIVE: &str = "info";
