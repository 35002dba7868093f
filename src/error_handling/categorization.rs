//! Error categorization and retry strategy.
//!
//! This module maps HTTP outcomes onto the [`LookupError`] taxonomy and
//! builds the bounded exponential backoff used when a lookup is retried.

use std::time::Duration;
use tokio_retry::strategy::ExponentialBackoff;

use super::types::LookupError;
use crate::config::HTTP_STATUS_TOO_MANY_REQUESTS;

/// Creates an exponential backoff retry strategy.
///
/// Returns a retry strategy configured with:
/// - Base delay: `RETRY_INITIAL_DELAY_MS` milliseconds, raised to the
///   attempt number, times `RETRY_FACTOR` (first retry waits 1s, later
///   retries hit the cap)
/// - Maximum delay: `RETRY_MAX_DELAY_SECS` seconds
/// - Maximum retries: `RETRY_MAX_RETRIES` after the initial request
///
/// # Returns
///
/// A retry strategy iterator ready for use with `tokio_retry::RetryIf`.
pub fn get_retry_strategy() -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(crate::config::RETRY_INITIAL_DELAY_MS)
        .factor(crate::config::RETRY_FACTOR)
        .max_delay(Duration::from_secs(crate::config::RETRY_MAX_DELAY_SECS))
        .take(crate::config::RETRY_MAX_RETRIES)
}

/// Categorizes a non-success HTTP status into a `LookupError`.
///
/// Rate limiting (429) and server errors (5xx) are transient and retried
/// with backoff; every other rejection is permanent. A malformed IP, for
/// example, is rejected by the service with a 4xx and will never succeed.
pub fn categorize_status(status: reqwest::StatusCode) -> LookupError {
    if status.as_u16() == HTTP_STATUS_TOO_MANY_REQUESTS {
        LookupError::Transient(format!("rate limited: HTTP {status}"))
    } else if status.is_server_error() {
        LookupError::Transient(format!("service error: HTTP {status}"))
    } else {
        LookupError::Permanent(format!("service rejected request: HTTP {status}"))
    }
}

/// Categorizes a `reqwest::Error` raised before any status was received.
///
/// Timeouts and connection failures are transient; a request that could not
/// even be built is permanent.
pub fn categorize_transport_error(error: &reqwest::Error) -> LookupError {
    if error.is_builder() {
        LookupError::Permanent(format!("request builder error: {error}"))
    } else if error.is_timeout() {
        LookupError::Transient(format!("request timed out: {error}"))
    } else if error.is_connect() {
        LookupError::Transient(format!("connection failed: {error}"))
    } else {
        LookupError::Transient(format!("request failed: {error}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_get_retry_strategy_max_retries() {
        let strategy = get_retry_strategy();
        assert_eq!(strategy.count(), crate::config::RETRY_MAX_RETRIES);
    }

    #[test]
    fn test_get_retry_strategy_exponential_backoff() {
        let delays: Vec<Duration> = get_retry_strategy().collect();

        // Delays increase (exponential backoff, capped at max)
        for i in 1..delays.len() {
            assert!(
                delays[i] >= delays[i - 1],
                "Delay should not decrease: {:?} then {:?}",
                delays[i - 1],
                delays[i]
            );
            assert!(delays[i] <= Duration::from_secs(crate::config::RETRY_MAX_DELAY_SECS));
        }
    }

    #[test]
    fn test_retry_delays_match_documented_sequence() {
        let delays: Vec<Duration> = get_retry_strategy().collect();

        assert_eq!(
            delays[0],
            Duration::from_millis(
                crate::config::RETRY_INITIAL_DELAY_MS * crate::config::RETRY_FACTOR
            )
        );
        for delay in &delays[1..] {
            assert_eq!(
                *delay,
                Duration::from_secs(crate::config::RETRY_MAX_DELAY_SECS)
            );
        }
    }

    #[test]
    fn test_categorize_status_rate_limit_is_transient() {
        let err = categorize_status(StatusCode::TOO_MANY_REQUESTS);
        assert!(err.is_transient());
    }

    #[test]
    fn test_categorize_status_server_error_is_transient() {
        assert!(categorize_status(StatusCode::INTERNAL_SERVER_ERROR).is_transient());
        assert!(categorize_status(StatusCode::BAD_GATEWAY).is_transient());
        assert!(categorize_status(StatusCode::SERVICE_UNAVAILABLE).is_transient());
    }

    #[test]
    fn test_categorize_status_client_error_is_permanent() {
        assert!(!categorize_status(StatusCode::BAD_REQUEST).is_transient());
        assert!(!categorize_status(StatusCode::NOT_FOUND).is_transient());
        assert!(!categorize_status(StatusCode::FORBIDDEN).is_transient());
    }
}
