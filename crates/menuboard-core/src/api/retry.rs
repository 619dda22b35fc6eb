//! Retry policy for transient request failures.
//!
//! Two failure kinds are retried with different schedules:
//!
//! - timeouts back off exponentially (1s, 2s, 4s) for up to 3 retries
//! - network failures back off linearly (1s, 2s) for up to 2 retries
//!
//! The attempt counter is shared by both kinds, so a request that first
//! times out and then loses its connection has already used one retry.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use super::ApiError;

/// Base delay for both backoff schedules.
/// 1 second gives a stalled backend time to recover without making users wait long.
const DEFAULT_BASE_DELAY_MS: u64 = 1000;

/// Maximum number of retries after a request timeout.
const DEFAULT_MAX_TIMEOUT_RETRIES: u32 = 3;

/// Maximum number of retries after a connection-level failure.
const DEFAULT_MAX_NETWORK_RETRIES: u32 = 2;

/// The kind of transient failure an attempt ended with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Timeout,
    Network,
}

/// Errors that can tell the retry loop whether they are transient
pub trait Retryable {
    fn failure_kind(&self) -> Option<FailureKind>;
}

impl Retryable for ApiError {
    fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            ApiError::Timeout { .. } => Some(FailureKind::Timeout),
            ApiError::Network(_) => Some(FailureKind::Network),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub base_delay: Duration,
    pub max_timeout_retries: u32,
    pub max_network_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
            max_timeout_retries: DEFAULT_MAX_TIMEOUT_RETRIES,
            max_network_retries: DEFAULT_MAX_NETWORK_RETRIES,
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries
    pub fn none() -> Self {
        Self {
            base_delay: Duration::ZERO,
            max_timeout_retries: 0,
            max_network_retries: 0,
        }
    }

    /// Same schedule shape with a different base delay
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Delay before the next attempt, or None when retries are exhausted.
    /// `attempt` is the zero-based number of retries already made.
    pub fn delay_for(&self, kind: FailureKind, attempt: u32) -> Option<Duration> {
        match kind {
            FailureKind::Timeout if attempt < self.max_timeout_retries => {
                Some(self.base_delay * 2u32.saturating_pow(attempt))
            }
            FailureKind::Network if attempt < self.max_network_retries => {
                Some(self.base_delay * (attempt + 1))
            }
            _ => None,
        }
    }
}

/// Run `op` until it succeeds, fails permanently, or the policy gives up.
/// The closure receives the zero-based attempt number.
pub async fn run<T, E, F, Fut>(policy: &RetryPolicy, label: &str, mut op: F) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + std::fmt::Display,
{
    let mut attempt = 0;
    loop {
        let err = match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        let delay = match err
            .failure_kind()
            .and_then(|kind| policy.delay_for(kind, attempt))
        {
            Some(delay) => delay,
            None => return Err(err),
        };

        attempt += 1;
        warn!(
            target_label = label,
            retry = attempt,
            backoff_ms = delay.as_millis() as u64,
            error = %err,
            "Request failed, backing off"
        );
        tokio::time::sleep(delay).await;
    }
}
