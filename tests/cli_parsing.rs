//! Tests for CLI option parsing.

use clap::error::ErrorKind;
use clap::Parser;

use ip2map::Config;

#[test]
fn test_minimal_invocation_uses_defaults() {
    let config = Config::try_parse_from(["ip2map", "ips.txt"]).expect("should parse");
    assert_eq!(config.target, "ips.txt");
    assert!(!config.quiet);
    assert_eq!(config.heading, "HEAT MAP");
    assert_eq!(config.sub_heading, "-- locations this month --");
    assert!(config.label.is_none());
    assert_eq!(config.max_concurrency, 10);
    assert!(!config.no_rasterize);
}

#[test]
fn test_ip_literal_target() {
    let config = Config::try_parse_from(["ip2map", "202.13.234.12"]).expect("should parse");
    assert_eq!(config.target, "202.13.234.12");
}

#[test]
fn test_all_documented_options() {
    let config = Config::try_parse_from([
        "ip2map",
        "ips.txt",
        "--quiet",
        "--heading",
        "World wide connections",
        "--sub-heading",
        "-- month: jul2014 --",
        "--label",
        "col13",
        "--ua",
        "custom-agent/1.0",
        "--api-url",
        "http://localhost:8080/geoip",
        "--max-concurrency",
        "4",
        "--timeout-seconds",
        "5",
        "--output-dir",
        "/tmp/maps",
        "--no-rasterize",
    ])
    .expect("should parse");

    assert!(config.quiet);
    assert_eq!(config.heading, "World wide connections");
    assert_eq!(config.sub_heading, "-- month: jul2014 --");
    assert_eq!(config.label.as_deref(), Some("col13"));
    assert_eq!(config.user_agent, "custom-agent/1.0");
    assert_eq!(config.api_url, "http://localhost:8080/geoip");
    assert_eq!(config.max_concurrency, 4);
    assert_eq!(config.timeout_seconds, 5);
    assert_eq!(config.output_dir, std::path::PathBuf::from("/tmp/maps"));
    assert!(config.no_rasterize);
}

#[test]
fn test_hyphen_leading_heading_values_parse() {
    // The default sub-heading itself starts with "--"; explicit values in
    // the same shape must parse rather than being read as unknown options.
    let config = Config::try_parse_from([
        "ip2map",
        "ips.txt",
        "--heading",
        "-- connections --",
        "--sub-heading",
        "-- month: jul2014 --",
    ])
    .expect("should parse");
    assert_eq!(config.heading, "-- connections --");
    assert_eq!(config.sub_heading, "-- month: jul2014 --");
}

#[test]
fn test_short_flags() {
    let config = Config::try_parse_from([
        "ip2map", "ips.txt", "-q", "-l", "label", "-u", "agent/2.0",
    ])
    .expect("should parse");
    assert!(config.quiet);
    assert_eq!(config.label.as_deref(), Some("label"));
    assert_eq!(config.user_agent, "agent/2.0");
}

#[test]
fn test_missing_target_is_an_error() {
    let err = Config::try_parse_from(["ip2map"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
}

#[test]
fn test_unknown_option_is_an_error() {
    let err = Config::try_parse_from(["ip2map", "ips.txt", "--nope"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownArgument);
}

#[test]
fn test_version_and_help_flags() {
    let err = Config::try_parse_from(["ip2map", "--version"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DisplayVersion);

    let err = Config::try_parse_from(["ip2map", "--help"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DisplayHelp);

    let err = Config::try_parse_from(["ip2map", "-h"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DisplayHelp);
}

#[test]
fn test_invalid_concurrency_value_is_an_error() {
    let err = Config::try_parse_from(["ip2map", "ips.txt", "--max-concurrency", "lots"])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValueValidation);
}
