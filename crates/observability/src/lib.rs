//! Tracing and logging (shared setup).

/// Initialize process-wide logging with the default configuration
/// (JSON lines, `info` unless `RUST_LOG` says otherwise).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init_with(&LogConfig::default());
}

/// Tracing configuration (filters, output format).
pub mod tracing;

pub use tracing::{LogConfig, LogFormat, UnknownLogFormat, init_with};
