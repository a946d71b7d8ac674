//! Retry with exponential backoff for quota-limited remote calls
//!
//! [`with_backoff`] wraps any fallible async operation. Errors the classifier
//! accepts are retried after `initial_delay, 2×initial_delay, 4×initial_delay, …`
//! up to `max_retries` times (so at most `max_retries + 1` attempts); any other
//! error is returned immediately without sleeping.

use crate::types::{AppError, Result};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::{error, warn};

/// Substrings (matched case-insensitively) that mark a quota / rate-limit error.
/// `code: 8` is the gRPC RESOURCE_EXHAUSTED status.
const QUOTA_MARKERS: [&str; 4] = ["429", "quota", "resource exhausted", "code: 8"];

/// Returns true if the error text looks like a quota or rate-limit rejection
pub fn is_quota_error(message: &str) -> bool {
    let lower = message.to_lowercase();
    QUOTA_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Backoff schedule
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Sleep before the first retry
    pub initial_delay: Duration,
    /// Growth factor applied after every sleep
    pub multiplier: u32,
}

impl RetryPolicy {
    /// Exponential policy with base factor 2
    pub fn new(max_retries: u32, initial_delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay,
            multiplier: 2,
        }
    }

    /// Policy that never retries
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Total attempts this policy allows
    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    /// The sleeps taken between attempts, in order
    pub fn schedule(&self) -> impl Iterator<Item = Duration> {
        let multiplier = self.multiplier;
        std::iter::successors(Some(self.initial_delay), move |d| {
            Some(d.saturating_mul(multiplier))
        })
        .take(self.max_retries as usize)
    }
}

/// Run `op` under `policy`, retrying only errors accepted by `is_retryable`.
///
/// `operation` names the call in log output.
pub async fn with_backoff<T, E, F, Fut, C>(
    policy: &RetryPolicy,
    operation: &str,
    is_retryable: C,
    mut op: F,
) -> std::result::Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: Display,
    C: Fn(&E) -> bool,
{
    let mut delay = policy.initial_delay;
    let mut attempt: u32 = 0;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if !is_retryable(&e) => return Err(e),
            Err(e) => {
                if attempt >= policy.max_retries {
                    error!(
                        operation,
                        max_retries = policy.max_retries,
                        error = %e,
                        "Max retries reached"
                    );
                    return Err(e);
                }
                attempt += 1;
                warn!(
                    operation,
                    attempt,
                    max_retries = policy.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Quota exceeded, backing off"
                );
                tokio::time::sleep(delay).await;
                delay = delay.saturating_mul(policy.multiplier);
            }
        }
    }
}

/// [`with_backoff`] specialised to [`AppError`] with the quota classifier
pub async fn retry_on_quota<T, F, Fut>(policy: &RetryPolicy, operation: &str, op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    with_backoff(policy, operation, |e: &AppError| is_quota_error(&e.to_string()), op).await
}
