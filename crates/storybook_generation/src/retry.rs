//! Fixed-interval retry for image requests.

use derive_getters::Getters;
use std::future::Future;
use std::time::Duration;
use storybook_error::{RetryableError, StorybookResult};
use tokio_retry2::strategy::FixedInterval;
use tokio_retry2::{Retry, RetryError};
use tracing::warn;

/// How often and how patiently to retry a failed image request.
///
/// Only transport failures are retried; upstream errors fail immediately.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use storybook_generation::RetryPolicy;
///
/// let policy = RetryPolicy::default();
/// assert_eq!(*policy.max_retries(), 2);
/// assert_eq!(*policy.delay(), Duration::from_millis(1500));
///
/// let quick = RetryPolicy::builder().max_retries(5usize).delay(Duration::from_millis(10)).build().unwrap();
/// assert_eq!(*quick.max_retries(), 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, derive_builder::Builder)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    #[builder(default = "2")]
    max_retries: usize,
    /// Pause between attempts
    #[builder(default = "Duration::from_millis(1500)")]
    delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            delay: Duration::from_millis(1500),
        }
    }
}

impl RetryPolicy {
    /// Creates a new builder.
    pub fn builder() -> RetryPolicyBuilder {
        RetryPolicyBuilder::default()
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            delay: Duration::ZERO,
        }
    }

    /// Run `op`, retrying retryable failures.
    ///
    /// # Errors
    ///
    /// The first permanent error, or the last retryable one once retries run out.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> StorybookResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = StorybookResult<T>>,
    {
        let strategy = FixedInterval::from_millis(self.delay.as_millis() as u64).take(self.max_retries);

        Retry::spawn(strategy, || {
            let attempt = op();
            async move {
                match attempt.await {
                    Ok(value) => Ok(value),
                    Err(e) if e.is_retryable() => {
                        warn!(error = %e.message(), "Transient failure, will retry");
                        Err(RetryError::Transient {
                            err: e,
                            retry_after: None,
                        })
                    }
                    Err(e) => Err(RetryError::Permanent(e)),
                }
            }
        })
        .await
    }
}
