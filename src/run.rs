//! Pipeline orchestration.
//!
//! Drives the full flow: read input → build the column plan → normalize →
//! bounded-concurrency enrichment with re-sequencing by row index →
//! aggregate → write artifacts. Row-level failures never abort the run; a
//! Ctrl-C abandons in-flight lookups but keeps completed rows and still
//! writes partial artifacts.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use log::{debug, info, warn};
use strum::IntoEnumIterator;
use tokio_util::sync::CancellationToken;

use crate::aggregate::{Aggregator, Dataset, RowOutcome};
use crate::config::{Config, PROGRESS_INTERVAL_SECS};
use crate::enrich::{GeoClient, GeoLookup};
use crate::error_handling::{ConfigError, FailureKind, LookupError, ProcessingStats};
use crate::initialization::init_client;
use crate::input::read_input;
use crate::render::MapOptions;
use crate::schema::{ColumnPlan, NormalizedRow};

/// Results of a completed pipeline run.
///
/// Contains the tally and the artifact paths. The run reports success even
/// when individual rows failed; only a total read failure or a configuration
/// error yields an `Err` instead of a report.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Total number of input rows processed
    pub total_rows: usize,
    /// Number of rows successfully enriched
    pub successful: usize,
    /// Number of rows aggregated with placeholder values
    pub failed: usize,
    /// Elapsed time in seconds
    pub elapsed_seconds: f64,
    /// Path of the dataset CSV artifact
    pub csv_path: PathBuf,
    /// Path of the map HTML artifact
    pub html_path: PathBuf,
    /// Path of the rasterized image, when rasterization ran and succeeded
    pub image_path: Option<PathBuf>,
}

/// Runs the enrichment pipeline with the production geolocation client.
///
/// This is the main entry point for the library.
///
/// # Errors
///
/// Returns an error if the input target cannot be read at all, the
/// configuration is invalid (unknown label column, bad api url), or an
/// artifact cannot be written. Per-row schema and lookup failures are
/// reported through the tally instead.
pub async fn run_pipeline(config: Config) -> Result<RunReport> {
    let client = init_client(&config).context("Failed to initialize HTTP client")?;
    let lookup: Arc<dyn GeoLookup> = Arc::new(GeoClient::new(client, &config.api_url)?);
    run_pipeline_with(config, lookup).await
}

/// Runs the pipeline against an injected [`GeoLookup`] capability.
///
/// Split out from [`run_pipeline`] so tests can substitute a deterministic
/// lookup implementation.
pub async fn run_pipeline_with(config: Config, lookup: Arc<dyn GeoLookup>) -> Result<RunReport> {
    let start_time = Instant::now();

    let table = read_input(&config.target)?;
    let plan = ColumnPlan::build(table.header.as_deref(), table.rows.first());

    // Label resolution happens before any network I/O so a bad --label fails fast.
    let label_column = match &config.label {
        Some(label) => Some(plan.resolve_column(label).ok_or_else(|| {
            ConfigError::UnknownLabelColumn {
                label: label.clone(),
                available: plan.columns().join(", "),
            }
        })?),
        None => None,
    };

    let total = table.rows.len();
    info!(
        "Gathering information for {} ip(s) ({} extra column(s))...",
        total,
        plan.extra_count()
    );

    let normalized: Vec<NormalizedRow> = table
        .rows
        .iter()
        .enumerate()
        .map(|(i, r)| plan.normalize(i, r))
        .collect();

    let stats = Arc::new(ProcessingStats::new());
    let completed = Arc::new(AtomicUsize::new(0));

    let cancel = CancellationToken::new();
    let interrupt_watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received; abandoning in-flight lookups, keeping completed rows");
                cancel.cancel();
            }
        })
    };

    let progress_cancel = cancel.child_token();
    let progress_task = {
        let completed = Arc::clone(&completed);
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(std::time::Duration::from_secs(PROGRESS_INTERVAL_SECS));
            interval.tick().await; // first tick fires immediately; skip it
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        log_progress(start_time, &completed, total);
                    }
                    _ = progress_cancel.cancelled() => {
                        break;
                    }
                }
            }
        })
    };

    let mut aggregator = Aggregator::new(plan, total);
    {
        let mut results = stream::iter(normalized.into_iter().enumerate())
            .map(|(index, row)| {
                let lookup = Arc::clone(&lookup);
                let cancel = cancel.clone();
                let stats = Arc::clone(&stats);
                async move {
                    let outcome = enrich_row(index, &row, lookup.as_ref(), &cancel, &stats).await;
                    (index, row, outcome)
                }
            })
            .buffer_unordered(config.max_concurrency.max(1));

        while let Some((index, row, outcome)) = results.next().await {
            aggregator.complete(index, row, outcome);
            completed.fetch_add(1, Ordering::SeqCst);
        }
    }

    cancel.cancel();
    let _ = progress_task.await;
    interrupt_watcher.abort();

    let dataset = aggregator.finish(Vec::new());
    let (successful, failed) = dataset.tally();
    log_progress(start_time, &completed, total);
    print_failure_statistics(&stats);

    let (csv_path, html_path, image_path) =
        write_artifacts(&config, &dataset, label_column).await?;

    Ok(RunReport {
        total_rows: total,
        successful,
        failed,
        elapsed_seconds: start_time.elapsed().as_secs_f64(),
        csv_path,
        html_path,
        image_path,
    })
}

/// Enriches one row: resolve its IP, perform the lookup (unless cancelled),
/// and record the outcome in the shared statistics.
async fn enrich_row(
    index: usize,
    row: &NormalizedRow,
    lookup: &dyn GeoLookup,
    cancel: &CancellationToken,
    stats: &ProcessingStats,
) -> RowOutcome {
    let ip = match row.require_ip(index) {
        Ok(ip) => ip.to_string(),
        Err(err) => {
            warn!("{err}; aggregating with placeholder values");
            stats.increment_failure(FailureKind::NoIpValue);
            return RowOutcome::NoIp(err);
        }
    };

    let started = Instant::now();
    let result = tokio::select! {
        _ = cancel.cancelled() => {
            Err(LookupError::Transient("run cancelled before lookup completed".into()))
        }
        result = lookup.lookup(&ip) => result,
    };

    match result {
        Ok(record) => {
            debug!("Lookup for {} succeeded in {:.2?}", ip, started.elapsed());
            stats.increment_success();
            RowOutcome::Enriched(record)
        }
        Err(err) => {
            warn!(
                "Lookup for {} failed after {:.2?}: {}",
                ip,
                started.elapsed(),
                err
            );
            stats.increment_failure(FailureKind::from(&err));
            RowOutcome::LookupFailed(err)
        }
    }
}

/// Writes the CSV and HTML artifacts, then optionally rasterizes the HTML.
///
/// Rasterization failures downgrade to a warning: the CSV and HTML already
/// exist, so the run still reports success.
async fn write_artifacts(
    config: &Config,
    dataset: &Dataset,
    label_column: Option<usize>,
) -> Result<(PathBuf, PathBuf, Option<PathBuf>)> {
    std::fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "Failed to create output directory {}",
            config.output_dir.display()
        )
    })?;
    crate::render::check_map_assets(&config.output_dir);

    let stem = crate::export::artifact_stem(&config.output_dir)?;
    let csv_path = crate::export::write_dataset_csv(
        dataset,
        &config.output_dir.join(format!("{stem}_data.csv")),
    )?;

    let options = MapOptions {
        heading: config.heading.clone(),
        sub_heading: config.sub_heading.clone(),
        label_column,
    };
    let html_name = format!("{stem}_html.html");
    let html_path =
        crate::render::write_map_html(dataset, &options, &config.output_dir.join(&html_name))?;

    let image_path = if config.no_rasterize {
        None
    } else {
        let image_name = format!("{stem}_map.png");
        match crate::render::rasterize(
            &config.output_dir,
            &html_name,
            &image_name,
            &config.rasterizer,
        )
        .await
        {
            Ok(()) => Some(config.output_dir.join(image_name)),
            Err(e) => {
                warn!("Map image could not be generated: {e:#}");
                None
            }
        }
    };

    Ok((csv_path, html_path, image_path))
}

/// Logs progress information about row processing.
fn log_progress(start_time: Instant, completed: &Arc<AtomicUsize>, total: usize) {
    let elapsed_secs = start_time.elapsed().as_secs_f64();
    let done = completed.load(Ordering::SeqCst);
    let rate = if elapsed_secs > 0.0 {
        done as f64 / elapsed_secs
    } else {
        0.0
    };
    info!(
        "Processed {}/{} rows in {:.2} seconds (~{:.2} rows/sec)",
        done, total, elapsed_secs, rate
    );
}

/// Logs the per-kind failure counts accumulated over the run.
fn print_failure_statistics(stats: &ProcessingStats) {
    let total_failures = stats.total_failures();
    if total_failures == 0 {
        return;
    }
    info!("Failure counts ({} total):", total_failures);
    for kind in FailureKind::iter() {
        let count = stats.get_failure_count(kind);
        if count > 0 {
            info!("   {}: {}", kind.as_str(), count);
        }
    }
}
