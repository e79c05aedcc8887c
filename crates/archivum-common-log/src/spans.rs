//! Validation spans and timing helpers.

use tracing::{debug_span, info_span, Span};

/// Create a span covering the validation of one evidence record.
pub fn evidence_record_span(record_id: &str) -> Span {
    info_span!("evidence_record", id = %record_id, error = tracing::field::Empty)
}

/// Create a span for a single archive-timestamp, addressed by its position.
pub fn archive_timestamp_span(chain: usize, timestamp: usize) -> Span {
    debug_span!("archive_timestamp", chain, timestamp)
}

/// Record an error on the current span.
pub fn record_error(error: &dyn std::error::Error) {
    Span::current().record("error", tracing::field::display(error));
}

/// Timing utility for operations.
pub struct Timer {
    start: std::time::Instant,
    operation: &'static str,
}

impl Timer {
    /// Start a new timer.
    pub fn start(operation: &'static str) -> Self {
        Self {
            start: std::time::Instant::now(),
            operation,
        }
    }

    /// Complete the timer and record duration.
    pub fn finish(self) -> std::time::Duration {
        let duration = self.start.elapsed();
        tracing::debug!(
            operation = %self.operation,
            duration_us = %duration.as_micros(),
            "operation completed"
        );
        duration
    }
}

/// Macro for timing a block of code.
#[macro_export]
macro_rules! timed {
    ($name:expr, $body:expr) => {{
        let _timer = $crate::spans::Timer::start($name);
        let result = $body;
        _timer.finish();
        result
    }};
}
