//! Caller-side retries for API calls.
//!
//! The transport never retries by itself: whether repeating a request is
//! safe is the caller's decision. Screens that want it wrap a call in
//! [`retry_transient`], which retries only on [`ApiError::is_transient`].
//!
//! # Example
//!
//! ```rust,no_run
//! use portal_client::retry::{retry_transient, RetryConfig};
//! use portal_client::{DepartmentsApi, ApiResult, Department};
//!
//! async fn load(api: &DepartmentsApi) -> ApiResult<Vec<Department>> {
//!     retry_transient(&RetryConfig::default(), || api.active()).await
//! }
//! ```

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;

use crate::error::{ApiError, ApiResult};

/// Retry behaviour.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Attempts including the first one.
    pub max_attempts: u32,

    /// Delay before the second attempt.
    pub initial_delay: Duration,

    /// Upper bound for any delay.
    pub max_delay: Duration,

    /// Growth factor between delays.
    pub exponential_base: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(5),
            exponential_base: 2.0,
        }
    }
}

impl RetryConfig {
    /// A configuration that makes a single attempt.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            exponential_base: 1.0,
        }
    }

    // A NaN product falls to `max_delay`, a negative one to zero.
    fn next_delay(&self, delay: Duration) -> Duration {
        Duration::from_secs_f64(
            (delay.as_secs_f64() * self.exponential_base)
                .min(self.max_delay.as_secs_f64())
                .max(0.0),
        )
    }
}

/// Run `f` until it succeeds, fails with an error `is_retryable` rejects,
/// or `max_attempts` is reached. Returns the last error.
pub async fn with_retry_if<F, Fut, T, E, P>(
    config: &RetryConfig,
    mut f: F,
    mut is_retryable: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: FnMut(&E) -> bool,
{
    let mut attempt = 0;
    let mut delay = config.initial_delay;

    loop {
        attempt += 1;

        match f().await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(attempts = attempt, "Request succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) if !is_retryable(&e) => return Err(e),
            Err(e) if attempt >= config.max_attempts => {
                tracing::warn!(attempts = attempt, error = %e, "Giving up after retries");
                return Err(e);
            }
            Err(e) => {
                tracing::debug!(
                    attempt,
                    max_attempts = config.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Request failed, retrying"
                );
                sleep(delay).await;
                delay = config.next_delay(delay);
            }
        }
    }
}

/// [`with_retry_if`] with [`ApiError::is_transient`] as the predicate.
pub async fn retry_transient<F, Fut, T>(config: &RetryConfig, f: F) -> ApiResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ApiResult<T>>,
{
    with_retry_if(config, f, ApiError::is_transient).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn quick() -> RetryConfig {
        RetryConfig {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            exponential_base: 2.0,
        }
    }

    fn unavailable() -> ApiError {
        ApiError::Http {
            status: 503,
            message: "Service Unavailable".into(),
            errors: vec![],
        }
    }

    #[test]
    fn test_next_delay_is_capped() {
        let config = quick();
        assert_eq!(config.next_delay(Duration::from_millis(1)), Duration::from_millis(2));
        assert_eq!(config.next_delay(Duration::from_millis(4)), Duration::from_millis(5));
    }

    #[test]
    fn test_next_delay_tolerates_bad_base() {
        let negative = RetryConfig {
            exponential_base: -2.0,
            ..quick()
        };
        assert_eq!(negative.next_delay(Duration::from_millis(4)), Duration::ZERO);

        let nan = RetryConfig {
            exponential_base: f64::NAN,
            ..quick()
        };
        assert_eq!(nan.next_delay(Duration::from_millis(4)), Duration::from_millis(5));
    }

    #[tokio::test]
    async fn test_transient_errors_are_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result = retry_transient(&quick(), || {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(unavailable())
                } else {
                    Ok(7)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_errors_return_immediately() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: ApiResult<()> = retry_transient(&quick(), || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(ApiError::Http {
                    status: 400,
                    message: "Name is required".into(),
                    errors: vec![],
                })
            }
        })
        .await;

        assert_eq!(result.unwrap_err().status(), 400);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_attempts_are_bounded() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: ApiResult<()> = retry_transient(&quick(), || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(ApiError::Timeout { timeout_secs: 15 })
            }
        })
        .await;

        assert_eq!(result.unwrap_err().status(), 408);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_no_retry_makes_one_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let _ = retry_transient::<_, _, ()>(&RetryConfig::no_retry(), || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(unavailable())
            }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
