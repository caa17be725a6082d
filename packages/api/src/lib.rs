#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Data fetch layer for the Saarthi Net dashboard.
//!
//! Fetches the three datasets (migration, peri-urban, digital risk) for a
//! `(district, period)` [`RequestKey`], one slot per dataset:
//!
//! 1. [`client`] issues the `GET` requests (`reqwest`), treating any
//!    non-2xx status as a failure without parsing the body.
//! 2. [`retry`] retries failed attempts a fixed number of times with a
//!    fixed delay.
//! 3. [`cache`] keeps results per key, fresh for a configured interval
//!    and retained for a longer one.
//! 4. [`query`] turns outcomes into loading/error/success states and
//!    substitutes the last known good value (or the all-empty fallback
//!    record) on failure, so rendering never sees an error value.
//! 5. [`dashboard`] runs the three queries concurrently and aggregates
//!    their states at read time.
//!
//! [`RequestKey`]: saarthi_net_dashboard_models::RequestKey

pub mod cache;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod progress;
pub mod query;
pub mod retry;

pub use client::{DashboardApi, HttpDashboardApi};
pub use config::{ApiConfig, QueryConfig};
pub use dashboard::DashboardQueries;
pub use query::{DatasetQuery, QueryStatus};

/// Errors from a single fetch attempt.
///
/// These never reach the render tree: [`query::DatasetQuery`] absorbs
/// them into an error state with fallback data.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// HTTP request failed (connect, timeout, body read).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-2xx status.
    #[error("HTTP {status} from {url}")]
    Status {
        /// Numeric status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// 2xx body was not valid JSON for the expected record.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The configured base URL could not be combined with an endpoint.
    #[error("Invalid URL: {message}")]
    InvalidUrl {
        /// Description of what went wrong.
        message: String,
    },
}

impl ApiError {
    /// Whether another attempt could plausibly succeed.
    ///
    /// Client errors other than `429 Too Many Requests` are permanent, as
    /// is a URL that cannot be built.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::InvalidUrl { .. } => false,
            Self::Http(_) | Self::Json(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_are_not_retryable() {
        let not_found = ApiError::Status {
            status: 404,
            url: "http://localhost/api/migration".to_string(),
        };
        assert!(!not_found.is_retryable());

        let throttled = ApiError::Status {
            status: 429,
            url: String::new(),
        };
        assert!(throttled.is_retryable());

        let unavailable = ApiError::Status {
            status: 503,
            url: String::new(),
        };
        assert!(unavailable.is_retryable());
    }
}
