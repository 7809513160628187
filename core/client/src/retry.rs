//! Fixed-interval retry for requests that time out.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use photogate_common::Result;

/// Default number of retries for status-style requests.
pub const DEFAULT_RETRY: u32 = 2;
/// Default delay between attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

/// Retry policy attached to a single request.
///
/// Only timeouts are retried. The delay between attempts is constant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt.
    pub retry: u32,
    /// Delay between attempts.
    #[serde(with = "duration_ms")]
    pub retry_delay: Duration,
}

impl RetryPolicy {
    /// Create a policy with `retry` retries and the default delay.
    pub fn new(retry: u32) -> Self {
        Self {
            retry,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            retry: 0,
            retry_delay: Duration::ZERO,
        }
    }

    /// Set the delay between attempts.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Total number of attempts a persistently timing-out request gets.
    pub fn max_attempts(&self) -> u32 {
        self.retry.saturating_add(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_RETRY)
    }
}

/// Mutable per-request metadata updated by the executor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestMeta {
    /// Number of retries performed so far.
    pub retry_count: u32,
}

/// Runs an operation under a [`RetryPolicy`].
pub struct RetryExecutor<'a> {
    policy: &'a RetryPolicy,
}

impl<'a> RetryExecutor<'a> {
    pub fn new(policy: &'a RetryPolicy) -> Self {
        Self { policy }
    }

    /// Execute an operation, resubmitting it on timeout.
    ///
    /// The operation receives the current retry count. `meta.retry_count`
    /// is incremented before every resubmission and stops at
    /// `policy.retry`; the last failure is then returned.
    pub async fn execute<F, Fut, T>(
        &self,
        label: &str,
        meta: &mut RequestMeta,
        mut operation: F,
    ) -> Result<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        loop {
            match operation(meta.retry_count).await {
                Ok(result) => {
                    if meta.retry_count > 0 {
                        debug!("{} succeeded after {} retries", label, meta.retry_count);
                    }
                    return Ok(result);
                }
                Err(err) => {
                    if !err.is_timeout() {
                        return Err(err);
                    }

                    if meta.retry_count >= self.policy.retry {
                        warn!(
                            "{} failed after {} attempts: {}",
                            label,
                            meta.retry_count + 1,
                            err
                        );
                        return Err(err);
                    }

                    meta.retry_count += 1;
                    warn!(
                        "Retrying request ({}/{}): {} in {:?}",
                        meta.retry_count, self.policy.retry, label, self.policy.retry_delay
                    );
                    sleep(self.policy.retry_delay).await;
                }
            }
        }
    }

    /// Get the policy.
    pub fn policy(&self) -> &RetryPolicy {
        self.policy
    }
}

/// Convenience function running `operation` with fresh metadata.
pub async fn retry_with_policy<F, Fut, T>(
    policy: &RetryPolicy,
    label: &str,
    operation: F,
) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut meta = RequestMeta::default();
    RetryExecutor::new(policy).execute(label, &mut meta, operation).await
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
