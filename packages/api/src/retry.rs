//! Fixed-delay retry for fetch attempts.
//!
//! Dataset queries wrap every fetch in [`with_retry`] instead of calling
//! the client directly, so a transient failure gets `retries` more
//! attempts spaced by a constant `delay` before the query gives up and
//! falls back. Permanent failures (see [`ApiError::is_retryable`]) are
//! returned immediately.

use std::future::Future;
use std::time::Duration;

use crate::ApiError;

/// How often and how far apart failed attempts are repeated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one.
    pub retries: u32,
    /// Pause before each extra attempt.
    pub delay: Duration,
}

impl RetryPolicy {
    /// A policy that never retries.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            retries: 0,
            delay: Duration::ZERO,
        }
    }
}

/// Runs `attempt` until it succeeds, fails permanently, or the policy's
/// retries are exhausted.
///
/// The `attempt` closure is called once per try to build a fresh future.
/// `label` only appears in log lines.
///
/// # Errors
///
/// Returns the last [`ApiError`] if every attempt failed.
pub async fn with_retry<T, F, Fut>(
    policy: RetryPolicy,
    label: &str,
    mut attempt: F,
) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut tries = 0;

    loop {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && tries < policy.retries => {
                tries += 1;
                log::warn!(
                    "{label}: {e} (retry {tries}/{} in {:?})",
                    policy.retries,
                    policy.delay
                );
                tokio::time::sleep(policy.delay).await;
            }
            Err(e) => {
                if tries > 0 {
                    log::error!("{label}: giving up after {tries} retries: {e}");
                }
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn server_error() -> ApiError {
        ApiError::Status {
            status: 500,
            url: "http://localhost/api/migration".to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn retries_once_then_succeeds() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy {
            retries: 1,
            delay: Duration::from_secs(1),
        };

        let result = with_retry(policy, "migration", || async {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(server_error())
            } else {
                Ok(42)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_retries_exhausted() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy {
            retries: 1,
            delay: Duration::from_secs(1),
        };

        let result: Result<(), _> = with_retry(policy, "migration", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(server_error())
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn permanent_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy {
            retries: 3,
            delay: Duration::from_secs(1),
        };

        let result: Result<(), _> = with_retry(policy, "peri-urban", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(ApiError::Status {
                status: 404,
                url: String::new(),
            })
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn none_policy_tries_once() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retry(RetryPolicy::none(), "digital-risk", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(server_error())
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
