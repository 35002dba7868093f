//! Row aggregation: merging lookup outcomes back into ordered rows.
//!
//! Lookups are dispatched concurrently and complete out of order; the
//! aggregator buffers each completion by its original row index so the final
//! dataset is always in input order, never success-biased. Every row that was
//! read reaches the dataset — a failed lookup leaves the row's normalized
//! values (placeholders plus pass-through extras) in place and flags it.

use crate::enrich::GeoRecord;
use crate::error_handling::{FailureKind, LookupError, SchemaError};
use crate::schema::{ColumnPlan, NormalizedRow, BASE_SCHEMA};

/// The outcome of one row's enrichment stage.
#[derive(Debug, Clone)]
pub enum RowOutcome {
    /// The lookup succeeded with these attributes.
    Enriched(GeoRecord),
    /// The row never reached the lookup: no resolvable IP value.
    NoIp(SchemaError),
    /// The lookup failed after retry handling.
    LookupFailed(LookupError),
}

/// Terminal status of one aggregated row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowStatus {
    /// Base fields hold real values from the lookup service.
    Success,
    /// Base fields hold placeholders; the kind says why.
    Failed(FailureKind),
}

/// One finished row: the full output value list plus its status.
#[derive(Debug, Clone)]
pub struct EnrichedRow {
    /// Output values, parallel to the dataset's column plan.
    pub values: Vec<String>,
    /// Whether the row's base fields are real or placeholder.
    pub status: RowStatus,
}

impl EnrichedRow {
    /// Whether the lookup for this row succeeded.
    pub fn is_success(&self) -> bool {
        self.status == RowStatus::Success
    }
}

/// Collects per-row completions and re-sequences them by original index.
///
/// Owned by the run orchestration; each row's result is transferred into it
/// exactly once, so no synchronization beyond the completion channel is
/// needed.
pub struct Aggregator {
    plan: ColumnPlan,
    slots: Vec<Option<EnrichedRow>>,
}

impl Aggregator {
    /// Creates an aggregator expecting `total` rows normalized through `plan`.
    pub fn new(plan: ColumnPlan, total: usize) -> Self {
        Aggregator {
            plan,
            slots: (0..total).map(|_| None).collect(),
        }
    }

    /// Records the completion of row `index`.
    ///
    /// On success the 12 base fields are overwritten from the lookup record
    /// (the extras are untouched); on failure the normalized values are kept
    /// as-is. Completing the same index twice is a bug and panics.
    pub fn complete(&mut self, index: usize, row: NormalizedRow, outcome: RowOutcome) {
        assert!(
            self.slots[index].is_none(),
            "row {index} completed more than once"
        );

        let enriched = match outcome {
            RowOutcome::Enriched(record) => {
                let mut values = row.values;
                let ip = values[0].clone();
                let base = record.base_values(&ip);
                values[..BASE_SCHEMA.len()].clone_from_slice(&base);
                EnrichedRow {
                    values,
                    status: RowStatus::Success,
                }
            }
            RowOutcome::NoIp(_) => EnrichedRow {
                values: row.values,
                status: RowStatus::Failed(FailureKind::NoIpValue),
            },
            RowOutcome::LookupFailed(err) => EnrichedRow {
                values: row.values,
                status: RowStatus::Failed(FailureKind::from(&err)),
            },
        };

        self.slots[index] = Some(enriched);
    }

    /// Number of rows completed so far.
    pub fn completed(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Finalizes the dataset in original input order.
    ///
    /// Rows that never completed (e.g. abandoned on cancellation) are
    /// finalized from their normalized values as transient failures, so the
    /// dataset always holds exactly one row per input row.
    pub fn finish(self, pending: Vec<(usize, NormalizedRow)>) -> Dataset {
        let mut slots = self.slots;
        for (index, row) in pending {
            if slots[index].is_none() {
                slots[index] = Some(EnrichedRow {
                    values: row.values,
                    status: RowStatus::Failed(FailureKind::TransientLookup),
                });
            }
        }

        let rows = slots
            .into_iter()
            .map(|slot| slot.expect("every input row must reach the dataset"))
            .collect();

        Dataset {
            plan: self.plan,
            rows,
        }
    }
}

/// The final ordered dataset: one enriched row per input row, all rows
/// sharing the same column set and order.
#[derive(Debug)]
pub struct Dataset {
    plan: ColumnPlan,
    rows: Vec<EnrichedRow>,
}

impl Dataset {
    /// The shared column plan (names and order) for every row.
    pub fn plan(&self) -> &ColumnPlan {
        &self.plan
    }

    /// The enriched rows, in original input order.
    pub fn rows(&self) -> &[EnrichedRow] {
        &self.rows
    }

    /// Number of rows in the dataset.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Success/failure tally: `(succeeded, failed)`.
    pub fn tally(&self) -> (usize, usize) {
        let succeeded = self.rows.iter().filter(|r| r.is_success()).count();
        (succeeded, self.rows.len() - succeeded)
    }

    /// Row counts per country code, most frequent first.
    ///
    /// Rows whose country code is still the placeholder (failed lookups) are
    /// excluded; they stay in the dataset but carry no mappable location.
    pub fn country_counts(&self) -> Vec<(String, usize)> {
        let mut counts: std::collections::HashMap<&str, usize> = std::collections::HashMap::new();
        for row in &self.rows {
            let code = row.values[crate::schema::COUNTRY_CODE_FIELD].as_str();
            if code != crate::schema::PLACEHOLDER && !code.is_empty() {
                *counts.entry(code).or_insert(0) += 1;
            }
        }
        let mut counts: Vec<(String, usize)> =
            counts.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        counts
    }
}
