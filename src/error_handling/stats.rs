//! Processing statistics tracking.
//!
//! This module provides thread-safe per-kind failure counters for the final
//! summary surfaced at the end of a run.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;
use strum_macros::EnumIter as EnumIterMacro;

use super::types::LookupError;

/// The kinds of row-level failures tracked across a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum FailureKind {
    /// The row had no resolvable IP value (schema failure).
    NoIpValue,
    /// The lookup failed with a transient error after retry exhaustion.
    TransientLookup,
    /// The lookup was rejected permanently by the service.
    PermanentLookup,
}

impl FailureKind {
    /// Returns a human-readable string representation of the failure kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::NoIpValue => "No IP value in row",
            FailureKind::TransientLookup => "Transient lookup failure",
            FailureKind::PermanentLookup => "Permanent lookup failure",
        }
    }
}

impl From<&LookupError> for FailureKind {
    fn from(err: &LookupError) -> Self {
        match err {
            LookupError::Transient(_) => FailureKind::TransientLookup,
            LookupError::Permanent(_) => FailureKind::PermanentLookup,
        }
    }
}

/// Thread-safe processing statistics tracker.
///
/// Tracks row successes and per-kind failures using atomic counters, allowing
/// concurrent access from multiple lookup tasks. All kinds are initialized to
/// zero on creation. Share across tasks with `Arc`.
pub struct ProcessingStats {
    successes: AtomicUsize,
    failures: HashMap<FailureKind, AtomicUsize>,
}

impl ProcessingStats {
    /// Creates a new statistics tracker with all counters at zero.
    pub fn new() -> Self {
        let mut failures = HashMap::new();
        for kind in FailureKind::iter() {
            failures.insert(kind, AtomicUsize::new(0));
        }

        ProcessingStats {
            successes: AtomicUsize::new(0),
            failures,
        }
    }

    /// Record one successfully enriched row.
    pub fn increment_success(&self) {
        self.successes.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one failed row under the given kind.
    ///
    /// All kinds are initialized in the constructor, so the lookup cannot
    /// miss; if it somehow does, the miss is logged rather than panicking.
    pub fn increment_failure(&self, kind: FailureKind) {
        if let Some(counter) = self.failures.get(&kind) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment failure counter for {:?} which is not in the map. \
                 This indicates a bug in ProcessingStats initialization.",
                kind
            );
        }
    }

    /// Number of successfully enriched rows so far.
    pub fn successes(&self) -> usize {
        self.successes.load(Ordering::SeqCst)
    }

    /// Get the count for a failure kind.
    pub fn get_failure_count(&self, kind: FailureKind) -> usize {
        self.failures
            .get(&kind)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Total failure count across all kinds.
    pub fn total_failures(&self) -> usize {
        FailureKind::iter().map(|k| self.get_failure_count(k)).sum()
    }
}

impl Default for ProcessingStats {
    fn default() -> Self {
        Self::new()
    }
}
