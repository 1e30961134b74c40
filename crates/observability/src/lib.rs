//! Tracing/logging setup shared by Warden binaries.

pub mod tracing;

pub use crate::tracing::LogFormat;

/// Initialize process-wide logging.
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init(format: LogFormat) {
    tracing::init(format);
}
