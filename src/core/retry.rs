use crate::utils::error::{Result, StatsError};
use std::future::Future;
use std::time::Duration;

/// Bounded retry with a fixed inter-attempt delay. The delay doubles as the
/// rate-limit floor, so it is never skipped on the error path.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            delay: Duration::from_millis(1000),
        }
    }
}

/// Classifies errors as transient (worth another attempt) or permanent.
pub trait IsRetryable {
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for StatsError {
    fn is_retryable(&self) -> bool {
        match self {
            StatsError::Http(e) => e.is_timeout() || e.is_connect(),
            StatsError::Server { status } => *status == 429 || (500..=599).contains(status),
            // Auth, Input, and decode failures are permanent; retrying with the
            // same session cannot succeed.
            _ => false,
        }
    }
}

/// Runs `operation` until it succeeds, fails permanently, or exhausts the
/// retry budget. Sleeps `policy.delay` before every retry.
pub async fn with_retry<F, Fut, T>(policy: &RetryPolicy, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    tracing::info!(attempts = attempt + 1, "request succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) if e.is_retryable() && attempt < policy.max_retries => {
                attempt += 1;
                tracing::warn!(
                    error = %e,
                    attempt = attempt,
                    max_retries = policy.max_retries,
                    "transient request failure, retrying"
                );
                tokio::time::sleep(policy.delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
