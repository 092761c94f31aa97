//! Tracing/logging setup shared by binaries.

/// Tracing configuration (filters, output format).
pub mod tracing;

pub use crate::tracing::{LogFormat, ParseLogFormatError};

/// Initialize process-wide observability with an explicit output format.
pub fn init_with(format: LogFormat) {
    crate::tracing::init(format);
}
