//! Geolocation enrichment.
//!
//! The enricher is the single component allowed to perform network I/O: one
//! lookup request per row, no batching. The service is modeled as an injected
//! capability ([`GeoLookup`]) so the pipeline can run against a deterministic
//! fake in tests; the production implementation is [`GeoClient`].

mod client;

pub use client::GeoClient;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};

use crate::error_handling::LookupError;
use crate::schema::{BASE_SCHEMA, PLACEHOLDER};

/// Capability for resolving one IP to its geolocation attributes.
///
/// Implementations own their retry policy; a returned error is final for the
/// row. Share across lookup tasks as an `Arc<dyn GeoLookup>`.
#[async_trait]
pub trait GeoLookup: Send + Sync {
    /// Looks up a single IP, returning its geolocation attributes or the
    /// final categorized failure.
    async fn lookup(&self, ip: &str) -> Result<GeoRecord, LookupError>;
}

/// The geolocation attributes of one IP, as returned by the lookup service.
///
/// Every field is optional: the service omits attributes it cannot resolve,
/// and absent fields become [`PLACEHOLDER`] when the record is merged into a
/// row. The `asn` field tolerates both string and numeric payload encodings.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct GeoRecord {
    /// Latitude in decimal degrees.
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees.
    pub longitude: Option<f64>,
    /// ISO 3166-1 alpha-2 country code.
    #[serde(alias = "country_code2")]
    pub country_code: Option<String>,
    /// ISO 3166-1 alpha-3 country code.
    pub country_code3: Option<String>,
    /// Country name.
    pub country: Option<String>,
    /// Region/state code within the country.
    pub region_code: Option<String>,
    /// Region/state name.
    pub region: Option<String>,
    /// City name.
    pub city: Option<String>,
    /// Postal code.
    pub postal_code: Option<String>,
    /// Autonomous system number of the announcing network.
    #[serde(default, deserialize_with = "string_or_number")]
    pub asn: Option<String>,
    /// Name of the service provider announcing the prefix.
    pub isp: Option<String>,
}

impl GeoRecord {
    /// Renders the record as the 12 base-schema values for one row.
    ///
    /// The `ipaddress` field always holds the row's own IP — the service's
    /// echo of it is not trusted. Absent attributes become [`PLACEHOLDER`];
    /// no null ever leaks into the dataset.
    pub fn base_values(&self, ip: &str) -> [String; 12] {
        fn fill(value: &Option<String>) -> String {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| PLACEHOLDER.to_string())
        }
        fn fill_num(value: Option<f64>) -> String {
            value
                .map(|v| v.to_string())
                .unwrap_or_else(|| PLACEHOLDER.to_string())
        }

        debug_assert_eq!(BASE_SCHEMA.len(), 12);
        [
            ip.to_string(),
            fill_num(self.latitude),
            fill_num(self.longitude),
            fill(&self.country_code),
            fill(&self.country_code3),
            fill(&self.country),
            fill(&self.region_code),
            fill(&self.region),
            fill(&self.city),
            fill(&self.postal_code),
            fill(&self.asn),
            fill(&self.isp),
        ]
    }
}

/// Deserializes a payload field that may be encoded as a string or a number.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}
