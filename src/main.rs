//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `ip2map` library that handles:
//! - Command-line argument parsing
//! - Logger initialization (quiet mode raises the filter to warnings)
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use ip2map::initialization::init_logger_with;
use ip2map::{run_pipeline, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    // Quiet mode suppresses progress/status output; the fatal-error message
    // and the final tally below bypass the logger entirely.
    let log_level = if config.quiet {
        log::LevelFilter::Warn
    } else {
        config.log_level.clone().into()
    };
    init_logger_with(log_level, config.log_format.clone()).context("Failed to initialize logger")?;

    match run_pipeline(config).await {
        Ok(report) => {
            println!(
                "Processed {} row{} ({} succeeded, {} failed) in {:.1}s",
                report.total_rows,
                if report.total_rows == 1 { "" } else { "s" },
                report.successful,
                report.failed,
                report.elapsed_seconds
            );
            println!("Data file: {}", report.csv_path.display());
            println!("Map document: {}", report.html_path.display());
            if let Some(image) = &report.image_path {
                println!("Map image: {}", image.display());
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("ip2map error: {:#}", e);
            process::exit(1);
        }
    }
}
