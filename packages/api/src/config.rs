//! Environment-driven configuration for the fetch layer.
//!
//! Read once at startup. Every variable is optional; unparseable numbers
//! fall back to their defaults with a warning rather than aborting.

use std::time::Duration;

use crate::ApiError;
use crate::retry::RetryPolicy;

/// Base URL of the backend API.
pub const API_BASE_URL_ENV: &str = "SAARTHI_API_BASE_URL";
/// Optional access token for the map renderer.
pub const MAP_ACCESS_TOKEN_ENV: &str = "SAARTHI_MAP_ACCESS_TOKEN";
/// Freshness interval override, in seconds.
pub const CACHE_STALE_SECS_ENV: &str = "SAARTHI_CACHE_STALE_SECS";
/// Retention interval override, in seconds.
pub const CACHE_TIME_SECS_ENV: &str = "SAARTHI_CACHE_TIME_SECS";
/// Retry count override.
pub const API_RETRY_COUNT_ENV: &str = "SAARTHI_API_RETRY_COUNT";
/// Retry delay override, in milliseconds.
pub const API_RETRY_DELAY_MS_ENV: &str = "SAARTHI_API_RETRY_DELAY_MS";

/// Used when [`API_BASE_URL_ENV`] is unset.
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8080";

/// Data is considered fresh for 5 minutes.
pub const CACHE_STALE_TIME: Duration = Duration::from_secs(5 * 60);
/// Data stays cached (stale) for 30 minutes.
pub const CACHE_TIME: Duration = Duration::from_secs(30 * 60);
/// One retry after the first failure.
pub const API_RETRY_COUNT: u32 = 1;
/// One second between attempts.
pub const API_RETRY_DELAY: Duration = Duration::from_secs(1);
/// Per-request timeout of the HTTP client.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Cache and retry tuning shared by the three dataset queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryConfig {
    /// How long a cached value is served without refetching.
    pub stale_time: Duration,
    /// How long a cached value is kept at all.
    pub cache_time: Duration,
    /// Retry behavior for failed fetches.
    pub retry: RetryPolicy,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            stale_time: CACHE_STALE_TIME,
            cache_time: CACHE_TIME,
            retry: RetryPolicy {
                retries: API_RETRY_COUNT,
                delay: API_RETRY_DELAY,
            },
        }
    }
}

/// Fetch-layer configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Backend base URL, e.g. `http://127.0.0.1:8080`.
    pub base_url: String,
    /// Map renderer token. `None` makes the map panel show a placeholder.
    pub map_access_token: Option<String>,
    /// Cache and retry tuning.
    pub query: QueryConfig,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            map_access_token: None,
            query: QueryConfig::default(),
            request_timeout: REQUEST_TIMEOUT,
        }
    }
}

impl ApiConfig {
    /// Reads the configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, which returns the value
    /// of an environment variable by name.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_blank = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let base_url = non_blank(API_BASE_URL_ENV).unwrap_or(defaults.base_url);
        let map_access_token = non_blank(MAP_ACCESS_TOKEN_ENV);
        if map_access_token.is_none() {
            log::info!("{MAP_ACCESS_TOKEN_ENV} not set, map will render as a placeholder");
        }

        let stale_time = parse_or(non_blank(CACHE_STALE_SECS_ENV), CACHE_STALE_SECS_ENV)
            .map_or(defaults.query.stale_time, Duration::from_secs);
        let cache_time = parse_or(non_blank(CACHE_TIME_SECS_ENV), CACHE_TIME_SECS_ENV)
            .map_or(defaults.query.cache_time, Duration::from_secs);
        let retries = parse_or(non_blank(API_RETRY_COUNT_ENV), API_RETRY_COUNT_ENV)
            .unwrap_or(defaults.query.retry.retries);
        let delay = parse_or(non_blank(API_RETRY_DELAY_MS_ENV), API_RETRY_DELAY_MS_ENV)
            .map_or(defaults.query.retry.delay, Duration::from_millis);

        Self {
            base_url,
            map_access_token,
            query: QueryConfig {
                stale_time,
                cache_time: cache_time.max(stale_time),
                retry: RetryPolicy { retries, delay },
            },
            request_timeout: defaults.request_timeout,
        }
    }

    /// Whether a map renderer token is available.
    #[must_use]
    pub const fn has_map_access(&self) -> bool {
        self.map_access_token.is_some()
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, name: &str) -> Option<T> {
    let value = value?;
    value.parse().map_or_else(
        |_| {
            log::warn!("Ignoring unparseable {name}={value:?}, using default");
            None
        },
        Some,
    )
}

/// Joins `endpoint` onto `base_url` and appends the non-empty `params` as
/// query pairs.
///
/// An absolute `endpoint` path replaces any path on the base, so both
/// `http://host:8080` and `http://host:8080/api` resolve
/// `/api/migration` to `http://host:8080/api/migration`.
///
/// # Errors
///
/// Returns [`ApiError::InvalidUrl`] if the base URL cannot be parsed or
/// the endpoint cannot be joined onto it.
pub fn build_api_url(
    base_url: &str,
    endpoint: &str,
    params: &[(&str, &str)],
) -> Result<reqwest::Url, ApiError> {
    let base = reqwest::Url::parse(base_url).map_err(|e| ApiError::InvalidUrl {
        message: format!("{base_url:?}: {e}"),
    })?;
    let mut url = base.join(endpoint).map_err(|e| ApiError::InvalidUrl {
        message: format!("{endpoint:?} on {base_url:?}: {e}"),
    })?;

    {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in params.iter().filter(|(_, v)| !v.is_empty()) {
            pairs.append_pair(key, value);
        }
    }
    if url.query() == Some("") {
        url.set_query(None);
    }

    Ok(url)
}
