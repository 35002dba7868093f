//! Production geolocation client backed by `reqwest`.

use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use tokio_retry::RetryIf;

use super::{GeoLookup, GeoRecord};
use crate::error_handling::{
    categorize_status, categorize_transport_error, get_retry_strategy, LookupError,
};

/// HTTP client for the remote geolocation service.
///
/// Issues one `GET {base}/{ip}` per lookup. Rate-limit (429) and transient
/// failures are retried with bounded exponential backoff; permanent
/// rejections stop immediately. The User-Agent and per-request timeout are
/// carried by the shared `reqwest::Client` built at initialization.
pub struct GeoClient {
    client: Arc<reqwest::Client>,
    api_base: String,
}

impl GeoClient {
    /// Creates a client for the service at `api_base`.
    ///
    /// The base is validated eagerly so a bad `--api-url` fails before any
    /// row is processed.
    pub fn new(
        client: Arc<reqwest::Client>,
        api_base: &str,
    ) -> Result<Self, crate::error_handling::ConfigError> {
        let trimmed = api_base.trim_end_matches('/');
        let parsed = reqwest::Url::parse(trimmed)
            .map_err(|_| crate::error_handling::ConfigError::InvalidApiUrl(api_base.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(crate::error_handling::ConfigError::InvalidApiUrl(
                api_base.to_string(),
            ));
        }
        Ok(GeoClient {
            client,
            api_base: trimmed.to_string(),
        })
    }

    /// One request attempt, without retry.
    async fn attempt(&self, ip: &str) -> Result<GeoRecord, LookupError> {
        let url = format!("{}/{}", self.api_base, ip);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| categorize_transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(categorize_status(status));
        }

        response
            .json::<GeoRecord>()
            .await
            .map_err(|e| LookupError::Permanent(format!("undecodable payload: {e}")))
    }
}

#[async_trait]
impl GeoLookup for GeoClient {
    async fn lookup(&self, ip: &str) -> Result<GeoRecord, LookupError> {
        let result = RetryIf::spawn(
            get_retry_strategy(),
            || self.attempt(ip),
            |err: &LookupError| {
                let retry = err.is_transient();
                if retry {
                    debug!("Retrying lookup for {}: {}", ip, err);
                }
                retry
            },
        )
        .await;

        if let Err(ref err) = result {
            debug!("Lookup for {} failed: {}", ip, err);
        }
        result
    }
}
