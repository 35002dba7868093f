//! Error handling and processing statistics.
//!
//! This module provides:
//! - The error taxonomy (fatal input/config errors, row-level schema and
//!   lookup errors)
//! - Thread-safe per-kind failure counters for the final summary
//! - Retry strategy configuration and HTTP error categorization
//!
//! Propagation policy: fatal errors abort before any partial output is
//! produced; row-level errors never abort the run — the affected row stays in
//! the dataset with placeholder values and is counted in the failure tally.

mod categorization;
mod stats;
mod types;

// Re-export public API
pub use categorization::{categorize_status, categorize_transport_error, get_retry_strategy};
pub use stats::{FailureKind, ProcessingStats};
pub use types::{ConfigError, InitializationError, InputError, LookupError, SchemaError};

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_processing_stats_initialization() {
        let stats = ProcessingStats::new();
        for kind in FailureKind::iter() {
            assert_eq!(stats.get_failure_count(kind), 0);
        }
        assert_eq!(stats.successes(), 0);
    }

    #[test]
    fn test_processing_stats_multiple_increments() {
        let stats = ProcessingStats::new();
        stats.increment_failure(FailureKind::NoIpValue);
        stats.increment_failure(FailureKind::NoIpValue);
        stats.increment_failure(FailureKind::PermanentLookup);
        assert_eq!(stats.get_failure_count(FailureKind::NoIpValue), 2);
        assert_eq!(stats.total_failures(), 3);
    }
}
