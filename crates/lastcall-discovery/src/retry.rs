//! Retry with exponential back-off and jitter for upstream discovery calls.
//!
//! Only transient failures are retried: connect/timeout errors, HTTP 429 and
//! 5xx. Auth failures, malformed bodies and empty answers are returned
//! immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::DiscoveryError;

const MAX_DELAY_MS: u64 = 30_000;

/// Transient failures: timeouts, refused connects, 429 and 5xx.
pub(crate) fn is_retriable(err: &DiscoveryError) -> bool {
    match err {
        DiscoveryError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        DiscoveryError::UnexpectedStatus { status, .. } => *status == 429 || *status >= 500,
        DiscoveryError::Deserialize { .. }
        | DiscoveryError::EmptyAnswer
        | DiscoveryError::InvalidBaseUrl { .. } => false,
    }
}

/// Runs `operation`, retrying transient failures up to `max_retries` times.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, DiscoveryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DiscoveryError>>,
{
    let mut retries = 0u32;
    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if retries >= max_retries || !is_retriable(&err) {
            return Err(err);
        }

        retries += 1;
        let delay = jittered(backoff_delay(backoff_base_ms, retries));
        tracing::warn!(
            retry = retries,
            max_retries,
            ?delay,
            error = %err,
            "transient discovery failure; backing off"
        );
        tokio::time::sleep(delay).await;
    }
}

/// Delay before retry number `retry` (1-based): `base * 2^(retry-1)`,
/// capped at 30 s.
fn backoff_delay(base_ms: u64, retry: u32) -> Duration {
    let exponent = retry.saturating_sub(1).min(10);
    Duration::from_millis(base_ms.saturating_mul(1 << exponent).min(MAX_DELAY_MS))
}

/// Spreads `delay` by ±25 %.
fn jittered(delay: Duration) -> Duration {
    delay.mul_f64(rand::random_range(0.75..=1.25))
}
