//! Map document generation.
//!
//! Builds the amCharts/amMap HTML document from an embedded template by
//! placeholder substitution: heading, sub-heading, a location table keyed
//! `"{country_code2}-{region_code}"`, one bubble entry per location group,
//! and heat-map area counts per country code. Rows whose lookup failed carry
//! placeholder location fields and are excluded from the map data — they
//! remain in the dataset and the CSV artifact.

mod rasterize;

pub use rasterize::rasterize;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{info, warn};
use serde_json::json;

use crate::aggregate::Dataset;
use crate::config::MAP_ASSETS;
use crate::schema::{CITY_FIELD, COUNTRY_CODE_FIELD, PLACEHOLDER};

const MAP_TEMPLATE: &str = include_str!("map_template.html");

/// Bubble fill color, matching the map's value legend.
const BUBBLE_COLOR: &str = "#6c00ff";

/// Output indices into the base schema used for map placement.
const LATITUDE_FIELD: usize = 1;
const LONGITUDE_FIELD: usize = 2;
const REGION_CODE_FIELD: usize = 6;

/// Presentation options for the map document.
#[derive(Debug, Clone)]
pub struct MapOptions {
    /// Heading rendered at the top of the map.
    pub heading: String,
    /// Sub-heading rendered under the heading.
    pub sub_heading: String,
    /// Output column index labelling the bubbles; `None` labels by city and
    /// shows the label on hover only.
    pub label_column: Option<usize>,
}

/// One bubble on the map: a location group with its row count and label.
struct LocationGroup {
    code: String,
    latitude: String,
    longitude: String,
    label: String,
    count: usize,
}

/// Builds the map HTML document for the dataset.
///
/// Pure string substitution over the embedded template; all dynamic pieces
/// are JSON-encoded so row values cannot break out of the script block.
pub fn build_map_document(dataset: &Dataset, options: &MapOptions) -> String {
    let groups = location_groups(dataset, options.label_column);

    let latlong: String = groups
        .iter()
        .map(|g| {
            format!(
                "latlong[{}] = {{\"latitude\":{}, \"longitude\":{}}};\n",
                json!(g.code),
                g.latitude,
                g.longitude
            )
        })
        .collect();

    let map_data: String = groups
        .iter()
        .map(|g| {
            json!({
                "code": g.code,
                "name": g.label,
                "value": g.count,
                "color": BUBBLE_COLOR,
            })
            .to_string()
        })
        .collect::<Vec<_>>()
        .join(",\n");

    let areas = json!(dataset
        .country_counts()
        .into_iter()
        .map(|(code, count)| json!({"id": code, "value": count}))
        .collect::<Vec<_>>())
    .to_string();

    let label_line = if options.label_column.is_some() {
        "label: dataItem.name,"
    } else {
        ""
    };

    MAP_TEMPLATE
        .replace("{{LATLONG}}", &latlong)
        .replace("{{MAP_DATA}}", &map_data)
        .replace("{{HEADING}}", &json!(options.heading).to_string())
        .replace("{{SUB_HEADING}}", &json!(options.sub_heading).to_string())
        .replace("{{AREAS}}", &areas)
        .replace("{{LABEL}}", label_line)
}

/// Writes the map HTML document to `path`.
pub fn write_map_html(dataset: &Dataset, options: &MapOptions, path: &Path) -> Result<PathBuf> {
    let document = build_map_document(dataset, options);
    std::fs::write(path, document)
        .with_context(|| format!("Failed to write map document {}", path.display()))?;
    info!("Map document generated @ {}", path.display());
    Ok(PathBuf::from(path))
}

/// Warns when the map library assets the document references are missing
/// from the output directory. Never fatal: the CSV and HTML artifacts are
/// useful on their own, and the assets can be dropped in afterwards.
pub fn check_map_assets(dir: &Path) {
    for asset in MAP_ASSETS {
        if !dir.join(asset).is_file() {
            warn!(
                "{} not present in {}; the map document will not render until it is",
                asset,
                dir.display()
            );
        }
    }
}

/// Groups mappable rows by location code, most frequent first.
///
/// The code is `{country_code2}-{region_code}` with any `/` stripped from
/// the region. Rows with a placeholder country code or coordinates are not
/// mappable and are skipped. The label comes from the first row of the
/// group: the configured label column, or the city by default.
fn location_groups(dataset: &Dataset, label_column: Option<usize>) -> Vec<LocationGroup> {
    let mut groups: Vec<LocationGroup> = Vec::new();

    for row in dataset.rows() {
        let country = row.values[COUNTRY_CODE_FIELD].as_str();
        let latitude = row.values[LATITUDE_FIELD].as_str();
        let longitude = row.values[LONGITUDE_FIELD].as_str();
        if country == PLACEHOLDER || latitude == PLACEHOLDER || longitude == PLACEHOLDER {
            continue;
        }

        let region = row.values[REGION_CODE_FIELD].replace('/', "");
        let code = format!("{country}-{region}");

        if let Some(group) = groups.iter_mut().find(|g| g.code == code) {
            group.count += 1;
            continue;
        }

        let label_field = label_column.unwrap_or(CITY_FIELD);
        groups.push(LocationGroup {
            code,
            latitude: latitude.to_string(),
            longitude: longitude.to_string(),
            label: row.values[label_field].clone(),
            count: 1,
        });
    }

    groups.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.code.cmp(&b.code)));
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{Aggregator, RowOutcome};
    use crate::enrich::GeoRecord;
    use crate::error_handling::LookupError;
    use crate::input::RawRow;
    use crate::schema::ColumnPlan;

    fn record(city: &str, country: &str, lat: f64, lng: f64) -> GeoRecord {
        GeoRecord {
            city: Some(city.into()),
            country_code: Some(country.into()),
            country: Some(country.into()),
            region_code: Some("11".into()),
            latitude: Some(lat),
            longitude: Some(lng),
            ..Default::default()
        }
    }

    fn dataset() -> Dataset {
        let header: Vec<String> = vec!["ip".into(), "label".into()];
        let plan = ColumnPlan::build(Some(&header), None);
        let rows = [
            ("10.0.0.1", "Server A"),
            ("10.0.0.2", "Server B"),
            ("10.0.0.3", "Server C"),
        ];
        let mut agg = Aggregator::new(plan.clone(), rows.len());
        for (i, (ip, label)) in rows.iter().enumerate() {
            let normalized = plan.normalize(i, &RawRow::new([*ip, *label]));
            let outcome = if i == 2 {
                RowOutcome::LookupFailed(LookupError::Transient("HTTP 500".into()))
            } else {
                RowOutcome::Enriched(record("Oslo", "NO", 59.91, 10.75))
            };
            agg.complete(i, normalized, outcome);
        }
        agg.finish(Vec::new())
    }

    #[test]
    fn test_document_embeds_headings_and_location_table() {
        let doc = build_map_document(
            &dataset(),
            &MapOptions {
                heading: "World wide connections".into(),
                sub_heading: "-- month: jul2014 --".into(),
                label_column: None,
            },
        );

        assert!(doc.contains("\"World wide connections\""));
        assert!(doc.contains("\"-- month: jul2014 --\""));
        assert!(doc.contains("latlong[\"NO-11\"]"));
        assert!(doc.contains("\"value\":2"));
        assert!(doc.contains(r#"[{"id":"NO","value":2}]"#));
    }

    #[test]
    fn test_failed_rows_are_excluded_from_map_data() {
        let groups = location_groups(&dataset(), None);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].count, 2);
    }

    #[test]
    fn test_label_column_feeds_bubble_name() {
        let doc = build_map_document(
            &dataset(),
            &MapOptions {
                heading: String::new(),
                sub_heading: String::new(),
                label_column: Some(12),
            },
        );
        assert!(doc.contains("\"name\":\"Server A\""));
        assert!(doc.contains("label: dataItem.name,"));
    }

    #[test]
    fn test_default_label_is_city_without_label_line() {
        let doc = build_map_document(
            &dataset(),
            &MapOptions {
                heading: String::new(),
                sub_heading: String::new(),
                label_column: None,
            },
        );
        assert!(doc.contains("\"name\":\"Oslo\""));
        assert!(!doc.contains("label: dataItem.name,"));
    }
}
