//! Configuration types and CLI options.
//!
//! This module defines the CLI surface and the enums used for logger
//! configuration.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::constants::{
    DEFAULT_API_URL, DEFAULT_MAX_CONCURRENCY, DEFAULT_RASTERIZER, DEFAULT_TIMEOUT_SECS,
    DEFAULT_USER_AGENT,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Application configuration, parsed from the command line.
///
/// The single positional argument is either an IP literal or a path to a
/// comma-delimited file whose rows each carry one IP plus arbitrary extra
/// columns. The struct can also be built programmatically (e.g. in tests)
/// via `Config::default()` plus field updates.
#[derive(Debug, Clone, Parser)]
#[command(name = "ip2map", version, about = "Plot IP addresses on a world bubble/heat map")]
pub struct Config {
    /// IP address or path to a CSV file of IPs
    pub target: String,

    /// Execute the program silently (progress and status output suppressed)
    #[arg(short, long)]
    pub quiet: bool,

    /// Heading for the map
    #[arg(long, default_value = "HEAT MAP", allow_hyphen_values = true)]
    pub heading: String,

    /// Sub heading for the map
    ///
    /// Values may start with a hyphen (the default does), so the argument
    /// accepts them explicitly.
    #[arg(
        long = "sub-heading",
        default_value = "-- locations this month --",
        allow_hyphen_values = true
    )]
    pub sub_heading: String,

    /// Column name from the generated data to label the bubbles, eg: -l col13
    #[arg(short, long)]
    pub label: Option<String>,

    /// User agent attached to every lookup request
    #[arg(short = 'u', long = "ua", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Base URL of the geolocation service
    #[arg(long, default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Maximum number of lookups in flight at once
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENCY)]
    pub max_concurrency: usize,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// Directory the CSV/HTML/image artifacts are written to
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// External command used to rasterize the map HTML to an image
    #[arg(long, default_value = DEFAULT_RASTERIZER)]
    pub rasterizer: String,

    /// Skip the rasterization step entirely
    #[arg(long)]
    pub no_rasterize: bool,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target: String::new(),
            quiet: false,
            heading: "HEAT MAP".to_string(),
            sub_heading: "-- locations this month --".to_string(),
            label: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            output_dir: PathBuf::from("."),
            rasterizer: DEFAULT_RASTERIZER.to_string(),
            no_rasterize: false,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        // Test all LogLevel variants convert correctly to log::LevelFilter
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Warn),
            log::LevelFilter::Warn
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Info),
            log::LevelFilter::Info
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.max_concurrency, DEFAULT_MAX_CONCURRENCY);
        assert_eq!(config.timeout_seconds, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.heading, "HEAT MAP");
        assert!(!config.quiet);
        assert!(!config.no_rasterize);
        assert_eq!(config.output_dir, PathBuf::from("."));
    }

    #[test]
    fn test_log_format_debug() {
        assert_eq!(format!("{:?}", LogFormat::Plain), "Plain");
        assert_eq!(format!("{:?}", LogFormat::Json), "Json");
    }
}
