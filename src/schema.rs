//! Schema normalization: the fixed base schema and the per-dataset column plan.
//!
//! Every output row carries the same closed column set: the 12 base
//! geolocation fields followed by the caller's extra columns. The column list
//! is computed exactly once per dataset — from the header, or from the first
//! record when the input is headerless — and applied uniformly to every row,
//! so no per-row schema inference ever happens.

use log::warn;

use crate::error_handling::SchemaError;
use crate::input::{is_ip_literal, RawRow};

/// The fixed 12-column base schema every row is normalized to contain.
///
/// `ipaddress` is the enrichment key; the remaining 11 attributes are filled
/// from the geolocation service's response. The list mirrors the service's
/// response shape and must remain stable across runs: downstream artifacts
/// (the CSV header, the `--label` option) resolve columns by these names.
pub const BASE_SCHEMA: [&str; 12] = [
    "ipaddress",
    "latitude",
    "longitude",
    "country_code2",
    "country_code3",
    "country",
    "region_code",
    "region",
    "city",
    "postal_code",
    "asn",
    "isp",
];

/// Sentinel filling base fields that are absent from a lookup response or
/// belong to a failed row. Never null/undefined: every cell holds a string.
pub const PLACEHOLDER: &str = "N/A";

/// Output index of the `ipaddress` column.
pub const IP_FIELD: usize = 0;

/// Output index of the `city` column (the default bubble label).
pub const CITY_FIELD: usize = 8;

/// Output index of the `country_code2` column (keys the heat map).
pub const COUNTRY_CODE_FIELD: usize = 3;

/// Resolves which input column holds the IP, with documented precedence:
///
/// 1. a header name containing `ip` (case-insensitive),
/// 2. else the first column of the probe record whose value parses as an IP
///    literal,
/// 3. else the first column.
///
/// The function is total — some column is always designated; a row whose
/// value at that column turns out blank fails later with a [`SchemaError`].
pub fn resolve_ip_column(header: Option<&[String]>, probe: Option<&RawRow>) -> usize {
    if let Some(header) = header {
        if let Some(idx) = header
            .iter()
            .position(|name| name.to_lowercase().contains("ip"))
        {
            return idx;
        }
    }
    if let Some(probe) = probe {
        if let Some(idx) = probe.values.iter().position(|v| is_ip_literal(v)) {
            return idx;
        }
    }
    0
}

/// The closed, pre-computed output column list for one dataset.
///
/// Built once before any row is normalized; holds the output names (base
/// fields first, extras after) and the input index feeding each of them.
/// Invariant: every [`NormalizedRow`] produced through the same plan has an
/// identical column set and order.
#[derive(Debug, Clone)]
pub struct ColumnPlan {
    columns: Vec<String>,
    /// Input index feeding each base field; `base_sources[0]` is the IP column.
    base_sources: [Option<usize>; 12],
    /// Input index feeding each extra column, parallel to `columns[12..]`.
    extra_sources: Vec<usize>,
    /// Number of input columns the plan accounts for.
    input_width: usize,
}

impl ColumnPlan {
    /// Builds the plan from the dataset's header, or from the first record
    /// when the input is headerless.
    ///
    /// With a header: a column whose name matches a base field (case-
    /// insensitive) is slotted into that field's position; the IP column is
    /// resolved by [`resolve_ip_column`] regardless of its exact header name;
    /// everything unmatched becomes an extra column, keeping its relative
    /// order and header name. Without a header: the resolved IP column feeds
    /// `ipaddress` and the remaining positional columns become extras named
    /// `colN` by their 1-based output ordinal (the first extra is `col13`).
    pub fn build(header: Option<&[String]>, probe: Option<&RawRow>) -> ColumnPlan {
        let ip_source = resolve_ip_column(header, probe);
        let mut base_sources: [Option<usize>; 12] = [None; 12];
        let mut extra_names: Vec<String> = Vec::new();
        let mut extra_sources: Vec<usize> = Vec::new();

        let input_width = header
            .map(|h| h.len())
            .or_else(|| probe.map(|p| p.values.len()))
            .unwrap_or(1);

        if ip_source < input_width {
            base_sources[IP_FIELD] = Some(ip_source);
        }

        if let Some(header) = header {
            for (i, name) in header.iter().enumerate() {
                if i == ip_source {
                    continue;
                }
                let lower = name.trim().to_lowercase();
                let base_slot = BASE_SCHEMA
                    .iter()
                    .skip(1)
                    .position(|base| *base == lower)
                    .map(|p| p + 1);
                match base_slot {
                    Some(slot) if base_sources[slot].is_none() => {
                        base_sources[slot] = Some(i);
                    }
                    _ => {
                        extra_names.push(name.trim().to_string());
                        extra_sources.push(i);
                    }
                }
            }
        } else {
            for i in 0..input_width {
                if i != ip_source {
                    extra_sources.push(i);
                }
            }
            for j in 0..extra_sources.len() {
                extra_names.push(format!("col{}", BASE_SCHEMA.len() + j + 1));
            }
        }

        let mut columns: Vec<String> = BASE_SCHEMA.iter().map(|s| s.to_string()).collect();
        columns.extend(extra_names);

        ColumnPlan {
            columns,
            base_sources,
            extra_sources,
            input_width,
        }
    }

    /// The output column names: the 12 base fields followed by the extras.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of output columns (12 base + extras).
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Number of extra (pass-through) columns.
    pub fn extra_count(&self) -> usize {
        self.extra_sources.len()
    }

    /// Input index of the designated IP column.
    pub fn ip_source(&self) -> usize {
        self.base_sources[IP_FIELD].unwrap_or(0)
    }

    /// Resolves a column reference to its output index.
    ///
    /// Accepts an exact column name (base or extra) or the positional form
    /// `colN` with a 1-based output ordinal, so `col13` always means the
    /// first extra column even when that column carries a header name.
    pub fn resolve_column(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        if let Some(idx) = self.columns.iter().position(|c| c == name) {
            return Some(idx);
        }
        if let Some(ordinal) = name
            .strip_prefix("col")
            .and_then(|n| n.parse::<usize>().ok())
        {
            if (1..=self.width()).contains(&ordinal) {
                return Some(ordinal - 1);
            }
        }
        None
    }

    /// Normalizes one raw row against this plan.
    ///
    /// Base fields start as [`PLACEHOLDER`] and are pre-filled from header-
    /// matched input columns where present; extras carry their input values,
    /// with missing trailing columns filled with the empty placeholder.
    /// Surplus values beyond the plan are dropped with a warning. Total:
    /// always yields a row of exactly `width()` values.
    pub fn normalize(&self, index: usize, raw: &RawRow) -> NormalizedRow {
        let mut values: Vec<String> = Vec::with_capacity(self.width());
        for source in self.base_sources.iter() {
            let value = source
                .and_then(|src| raw.values.get(src))
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(|v| v.to_string())
                .unwrap_or_else(|| PLACEHOLDER.to_string());
            values.push(value);
        }
        for src in &self.extra_sources {
            values.push(raw.values.get(*src).cloned().unwrap_or_default());
        }

        if raw.values.len() > self.input_width {
            warn!(
                "Row {} has {} column(s) beyond the dataset schema; dropping the surplus",
                index + 1,
                raw.values.len() - self.input_width
            );
        }

        NormalizedRow { values }
    }
}

/// One row normalized against a [`ColumnPlan`]: exactly the plan's columns,
/// in the plan's order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRow {
    /// Output values, parallel to the plan's column list.
    pub values: Vec<String>,
}

impl NormalizedRow {
    /// The row's IP value, when one was resolvable.
    pub fn ip(&self) -> Option<&str> {
        self.values
            .get(IP_FIELD)
            .map(String::as_str)
            .filter(|v| !v.is_empty() && *v != PLACEHOLDER)
    }

    /// The row's IP value, or a [`SchemaError`] naming the row when the cell
    /// at the designated IP column is blank.
    pub fn require_ip(&self, index: usize) -> Result<&str, SchemaError> {
        self.ip().ok_or_else(|| SchemaError {
            row: index,
            column: BASE_SCHEMA[IP_FIELD].to_string(),
        })
    }
}
