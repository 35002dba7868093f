//! Tests for the CSV artifact and the map document, built from a dataset
//! assembled the same way the pipeline assembles one.

use ip2map::aggregate::{Aggregator, Dataset, RowOutcome};
use ip2map::enrich::GeoRecord;
use ip2map::error_handling::LookupError;
use ip2map::export::{artifact_stem, write_dataset_csv};
use ip2map::input::RawRow;
use ip2map::render::{build_map_document, write_map_html, MapOptions};
use ip2map::schema::ColumnPlan;

fn record(city: &str, country: &str, region: &str, lat: f64, lng: f64) -> GeoRecord {
    GeoRecord {
        latitude: Some(lat),
        longitude: Some(lng),
        country_code: Some(country.to_string()),
        country: Some(country.to_string()),
        region_code: Some(region.to_string()),
        city: Some(city.to_string()),
        ..Default::default()
    }
}

/// Four rows: two in NO-03, one in SE-27, one failed lookup.
fn dataset() -> Dataset {
    let header: Vec<String> = vec!["ip".into(), "label".into()];
    let plan = ColumnPlan::build(Some(&header), None);

    let outcomes = [
        ("10.0.0.1", "Server A", Some(record("Oslo", "NO", "03", 59.91, 10.75))),
        ("10.0.0.2", "Server B", Some(record("Oslo", "NO", "03", 59.91, 10.75))),
        ("10.0.0.3", "Server C", Some(record("Malmo", "SE", "27", 55.6, 13.0))),
        ("10.0.0.4", "Server D", None),
    ];

    let mut agg = Aggregator::new(plan.clone(), outcomes.len());
    for (i, (ip, label, rec)) in outcomes.into_iter().enumerate() {
        let normalized = plan.normalize(i, &RawRow::new([ip, label]));
        let outcome = match rec {
            Some(rec) => RowOutcome::Enriched(rec),
            None => RowOutcome::LookupFailed(LookupError::Transient("HTTP 503".into())),
        };
        agg.complete(i, normalized, outcome);
    }
    agg.finish(Vec::new())
}

fn options() -> MapOptions {
    MapOptions {
        heading: "World wide connections".to_string(),
        sub_heading: "-- month: jul2014 --".to_string(),
        label_column: None,
    }
}

#[test]
fn test_csv_layout_is_header_rows_then_country_summary() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("out.csv");
    write_dataset_csv(&dataset(), &path).expect("write CSV");

    let contents = std::fs::read_to_string(&path).expect("read CSV");
    let lines: Vec<&str> = contents.lines().collect();

    assert_eq!(lines.len(), 1 + 4 + 2);
    assert_eq!(
        lines[0],
        "ipaddress,latitude,longitude,country_code2,country_code3,country,region_code,region,city,postal_code,asn,isp,label"
    );
    assert!(lines[1].starts_with("10.0.0.1,59.91,10.75,NO,"));
    assert!(lines[1].ends_with(",Server A"));
    // The failed row keeps its slot with placeholder base fields
    assert!(lines[4].starts_with("10.0.0.4,N/A,N/A,N/A,"));
    assert!(lines[4].ends_with(",Server D"));
    // Country summary, most frequent first
    assert_eq!(lines[5], "NO,2");
    assert_eq!(lines[6], "SE,1");
}

#[test]
fn test_artifact_stem_increments_per_run() {
    let dir = tempfile::tempdir().expect("tempdir");

    let first = artifact_stem(dir.path()).expect("stem");
    assert!(first.ends_with("_01"), "unexpected stem: {first}");
    std::fs::write(dir.path().join(format!("{first}_data.csv")), "x").expect("touch artifact");
    std::fs::write(dir.path().join(format!("{first}_html.html")), "x").expect("touch artifact");

    let second = artifact_stem(dir.path()).expect("stem");
    assert!(second.ends_with("_02"), "unexpected stem: {second}");
    assert_ne!(first, second);
}

#[test]
fn test_map_document_substitutes_every_placeholder() {
    let doc = build_map_document(&dataset(), &options());

    assert!(!doc.contains("{{"), "unsubstituted placeholder left in document");
    assert!(doc.contains("\"World wide connections\""));
    assert!(doc.contains("\"-- month: jul2014 --\""));
    assert!(doc.contains("latlong[\"NO-03\"]"));
    assert!(doc.contains("latlong[\"SE-27\"]"));
    // Bubble values carry the per-location row counts
    assert!(doc.contains("\"value\":2"));
    // Heat-map areas carry the per-country counts
    assert!(doc.contains(r#"{"id":"NO","value":2}"#));
    assert!(doc.contains(r#"{"id":"SE","value":1}"#));
}

#[test]
fn test_failed_rows_stay_out_of_the_map_but_in_the_csv() {
    let doc = build_map_document(&dataset(), &options());
    assert!(!doc.contains("N/A"));
    assert!(!doc.contains("Server D"));
}

#[test]
fn test_label_column_switches_bubble_names() {
    let mut options = options();
    options.label_column = Some(12);

    let doc = build_map_document(&dataset(), &options);
    assert!(doc.contains("\"name\":\"Server A\""));
    assert!(doc.contains("label: dataItem.name,"));

    let by_city = build_map_document(&dataset(), &MapOptions {
        label_column: None,
        ..options
    });
    assert!(by_city.contains("\"name\":\"Oslo\""));
    assert!(!by_city.contains("label: dataItem.name,"));
}

#[test]
fn test_write_map_html_produces_the_document() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("map.html");
    write_map_html(&dataset(), &options(), &path).expect("write map document");

    let contents = std::fs::read_to_string(&path).expect("read map document");
    assert!(contents.contains("latlong[\"NO-03\"]"));
}

#[test]
fn test_row_values_cannot_break_out_of_the_script_block() {
    let header: Vec<String> = vec!["ip".into(), "label".into()];
    let plan = ColumnPlan::build(Some(&header), None);
    let mut agg = Aggregator::new(plan.clone(), 1);
    let normalized = plan.normalize(0, &RawRow::new(["10.0.0.1", "</script><b>x</b>"]));
    agg.complete(
        0,
        normalized,
        RowOutcome::Enriched(record("\"quoted\" city", "NO", "03", 59.91, 10.75)),
    );
    let dataset = agg.finish(Vec::new());

    let doc = build_map_document(&dataset, &options());
    assert!(!doc.contains("\"quoted\" city"));
    assert!(doc.contains(r#"\"quoted\" city"#));
}
