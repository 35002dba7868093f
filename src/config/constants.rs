//! Configuration constants.
//!
//! This module defines the operational parameters used throughout the
//! application: service defaults, concurrency limits, and retry tuning.

/// Default base URL of the remote geolocation service.
///
/// One GET request per IP is issued at `{base}/{ip}`. The service returns a
/// JSON payload with the geolocation attributes that feed the base schema.
/// Users can point at a self-hosted instance via the `--api-url` CLI flag.
pub const DEFAULT_API_URL: &str = "http://www.telize.com/geoip";

/// Default User-Agent string attached to every lookup request.
///
/// This is a pass-through value with no internal logic; some public
/// geolocation endpoints reject requests without a browser-like User-Agent.
/// Users can override it via the `-u/--ua` CLI flag.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 6.3; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/37.0.2049.0 Safari/537.36";

/// Default maximum number of lookups in flight at once.
///
/// Lookups are independent per row, so they run as a bounded-concurrency map
/// over the row sequence. The bound keeps request pressure on the remote
/// service reasonable; raise it only for self-hosted endpoints.
pub const DEFAULT_MAX_CONCURRENCY: usize = 10;

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Progress logging interval in seconds while enrichment runs.
pub const PROGRESS_INTERVAL_SECS: u64 = 5;

// Retry strategy
/// Base delay in milliseconds feeding the exponential backoff.
///
/// `tokio_retry` raises this base to the attempt number, so the sequence
/// grows steeply: the first retry waits `base * RETRY_FACTOR` (1s), and
/// every later retry hits the `RETRY_MAX_DELAY_SECS` cap.
pub const RETRY_INITIAL_DELAY_MS: u64 = 500;
/// Constant multiplier applied to every delay in the backoff sequence.
pub const RETRY_FACTOR: u64 = 2;
/// Maximum delay between retries in seconds; the effective bound on waits.
pub const RETRY_MAX_DELAY_SECS: u64 = 15;
/// Maximum number of retries after the initial request.
///
/// Only rate-limit (429) and transient failures are retried; a permanent
/// rejection stops immediately. With 3 retries a row sees at most 4 requests.
pub const RETRY_MAX_RETRIES: usize = 3;

// HTTP status codes (for clarity and consistency)
/// HTTP 429 Too Many Requests, the service's rate-limit signal.
pub const HTTP_STATUS_TOO_MANY_REQUESTS: u16 = 429;

// Map library assets expected next to the generated HTML document
/// File names the map document references at render time. Their absence is
/// reported as a warning, never a fatal error.
pub const MAP_ASSETS: [&str; 3] = ["ammap.js", "ammap.css", "worldHigh.svg"];

/// Default external command used to rasterize the map HTML to an image.
pub const DEFAULT_RASTERIZER: &str = "phantomjs";
