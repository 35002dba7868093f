//! Dataset CSV artifact writing.
//!
//! The CSV is the dataset verbatim: a header row holding the column plan's
//! names, one record per row in input order, then the per-country summary
//! counts appended after the data.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use csv::WriterBuilder;
use log::info;

use crate::aggregate::Dataset;

/// Picks the artifact name stem for this run: `<YYYYMMDD>_<NN>`.
///
/// `<NN>` is one past the highest sequence number already present for
/// today's date in `dir`, so repeated runs on the same day never overwrite
/// each other's artifacts.
pub fn artifact_stem(dir: &Path) -> Result<String> {
    let date = Local::now().format("%Y%m%d").to_string();
    let mut highest = 0u32;

    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to list output directory {}", dir.display()))?;
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        if let Some(rest) = name.strip_prefix(&format!("{date}_")) {
            if let Some(seq) = rest.split('_').next().and_then(|s| s.parse::<u32>().ok()) {
                highest = highest.max(seq);
            }
        }
    }

    Ok(format!("{date}_{:02}", highest + 1))
}

/// Writes the dataset CSV artifact to `path`.
///
/// Layout: header = plan column names, one record per dataset row in input
/// order, then one `(country_code, count)` summary record per country.
pub fn write_dataset_csv(dataset: &Dataset, path: &Path) -> Result<PathBuf> {
    // The summary records are narrower than the data rows, so the writer
    // must be flexible about field counts.
    let mut writer = WriterBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to create CSV artifact {}", path.display()))?;

    writer
        .write_record(dataset.plan().columns())
        .context("Failed to write CSV header")?;
    for row in dataset.rows() {
        writer
            .write_record(&row.values)
            .context("Failed to write CSV row")?;
    }
    for (code, count) in dataset.country_counts() {
        writer
            .write_record([code.as_str(), &count.to_string()])
            .context("Failed to write CSV country summary")?;
    }
    writer.flush().context("Failed to flush CSV artifact")?;

    info!("Data file generated @ {}", path.display());
    Ok(PathBuf::from(path))
}
