//! ip2map library: IP geolocation enrichment and map generation.
//!
//! This library takes a list of IP addresses (a single literal or a CSV file
//! with arbitrary extra columns), enriches each with geolocation/network
//! attributes from a remote lookup service, and produces a deterministic,
//! schema-stable dataset plus map artifacts (CSV, amMap HTML document, and
//! optionally a rasterized image).
//!
//! # Example
//!
//! ```no_run
//! use ip2map::{run_pipeline, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     target: "ips.txt".to_string(),
//!     heading: "World wide connections".to_string(),
//!     ..Default::default()
//! };
//!
//! let report = run_pipeline(config).await?;
//! println!(
//!     "Processed {} rows: {} succeeded, {} failed",
//!     report.total_rows, report.successful, report.failed
//! );
//! # Ok(())
//! # }
//! ```
//!
//! # Column naming
//!
//! Every dataset row carries the same closed column set: the 12 base fields
//! in [`schema::BASE_SCHEMA`] followed by the input's extra columns. An
//! extra column named by a header keeps its name; a positional extra is
//! named `colN` by its 1-based output ordinal (the first extra is `col13`).
//! The `--label` option resolves against either form.

#![warn(missing_docs)]

pub mod aggregate;
pub mod config;
pub mod enrich;
pub mod error_handling;
pub mod export;
pub mod initialization;
pub mod input;
pub mod render;
mod run;
pub mod schema;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel};
pub use run::{run_pipeline, run_pipeline_with, RunReport};
