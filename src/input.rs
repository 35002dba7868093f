//! Input reading: IP literals and delimited files.
//!
//! The single CLI argument is either a plausible IP literal or a path to a
//! comma-delimited file. Files are read in order and never reordered or
//! filtered; a malformed line is skipped with a warning so one bad line does
//! not sacrifice the rest of the dataset. Only a total read failure (missing
//! or undecodable file) is fatal.

use std::net::IpAddr;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::error_handling::InputError;

/// One raw input row: the column values in original input order.
///
/// A bare IP input yields a single-value row. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// Raw string values in input-column order.
    pub values: Vec<String>,
}

impl RawRow {
    /// Builds a row from anything iterable as string-ish values.
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RawRow {
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// The parsed input: an optional header plus the data rows in file order.
#[derive(Debug, Clone)]
pub struct InputTable {
    /// Column names from the file's first record, when that record did not
    /// look like data (i.e. none of its fields parses as an IP literal).
    pub header: Option<Vec<String>>,
    /// Data rows in original order.
    pub rows: Vec<RawRow>,
    /// Number of malformed lines that were skipped with a warning.
    pub skipped_lines: usize,
}

/// Returns true if the string parses as an IPv4 or IPv6 literal.
pub fn is_ip_literal(value: &str) -> bool {
    value.trim().parse::<IpAddr>().is_ok()
}

/// Reads the CLI target into an [`InputTable`].
///
/// A plausible IP literal becomes a one-row headerless table; anything else
/// is treated as a file path and parsed as a comma-delimited table.
///
/// # Errors
///
/// Returns [`InputError`] if the target is neither an IP literal nor a
/// readable file.
pub fn read_input(target: &str) -> Result<InputTable, InputError> {
    if is_ip_literal(target) {
        debug!("Target '{}' is an IP literal", target);
        return Ok(InputTable {
            header: None,
            rows: vec![RawRow::new([target.trim()])],
            skipped_lines: 0,
        });
    }
    read_file(Path::new(target))
}

/// Reads a comma-delimited file into an [`InputTable`].
///
/// Header detection: the first record is taken as a header unless any of its
/// fields parses as an IP literal, in which case the file is headerless and
/// the first record is data (this covers the bare IP list case). Blank lines
/// are skipped; a line the CSV reader cannot decode is skipped with a
/// warning and counted in `skipped_lines`.
pub fn read_file(path: &Path) -> Result<InputTable, InputError> {
    if !path.is_file() {
        return Err(InputError::FileNotFound(PathBuf::from(path)));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| InputError::Unreadable {
            path: PathBuf::from(path),
            reason: e.to_string(),
        })?;

    let mut records: Vec<RawRow> = Vec::new();
    let mut skipped_lines = 0usize;
    for (line_no, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping malformed line {} in {}: {e}", line_no + 1, path.display());
                skipped_lines += 1;
                continue;
            }
        };
        let values: Vec<String> = record.iter().map(|v| v.trim().to_string()).collect();
        if values.iter().all(|v| v.is_empty()) {
            continue;
        }
        records.push(RawRow { values });
    }

    // First record is a header unless it already contains an IP literal.
    let header = match records.first() {
        Some(first) if !first.values.iter().any(|v| is_ip_literal(v)) => {
            let header = records.remove(0).values;
            debug!("Detected header: {:?}", header);
            Some(header)
        }
        _ => None,
    };

    debug!(
        "Read {} row(s) from {} ({} malformed line(s) skipped)",
        records.len(),
        path.display(),
        skipped_lines
    );

    Ok(InputTable {
        header,
        rows: records,
        skipped_lines,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_ip_literal() {
        assert!(is_ip_literal("202.13.234.12"));
        assert!(is_ip_literal("2001:db8::1"));
        assert!(is_ip_literal(" 10.0.0.1 "));
        assert!(!is_ip_literal("ips.txt"));
        assert!(!is_ip_literal("Server A"));
        assert!(!is_ip_literal(""));
    }

    #[test]
    fn test_ip_literal_target_yields_one_headerless_row() {
        let table = read_input("202.13.234.12").expect("IP literal should parse");
        assert!(table.header.is_none());
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].values, vec!["202.13.234.12"]);
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let err = read_input("definitely/not/a/file.csv").unwrap_err();
        assert!(matches!(err, InputError::FileNotFound(_)));
    }
}
