//! Retry controller: exponential backoff with jitter over a fallible call

use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Backoff parameters for [`run_with_retry`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of retries after the initial attempt
    pub max_retries: u32,
    /// Delay before the first retry grows from this value
    pub initial_delay: Duration,
    /// Upper bound on any single delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_delay: Duration::from_millis(2000),
            max_delay: Duration::from_millis(60_000),
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries; the first failure is final.
    pub fn no_retries() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }
}

/// Whether an error message names a transient service condition.
///
/// The classification is textual on purpose: the generation boundary
/// surfaces upstream error text verbatim, and "503", "overloaded" and
/// "UNAVAILABLE" are the vocabulary the service uses when a later attempt
/// can succeed. Everything else is fatal.
pub fn is_retryable(message: &str) -> bool {
    message.contains("503") || message.contains("overloaded") || message.contains("UNAVAILABLE")
}

/// Run `op`, retrying transient failures with jittered exponential backoff.
///
/// Fatal errors (per [`is_retryable`] over the rendered message) are
/// re-raised immediately. On a transient failure the next delay is
/// `min(delay * 1.5 * jitter, max_delay)` with jitter drawn uniformly from
/// `[0.85, 1.15]`; after `max_retries` transient failures the last error is
/// re-raised.
pub async fn run_with_retry<T, E, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut delay = policy.initial_delay;
    let mut retries: u32 = 0;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                let message = err.to_string();
                if !is_retryable(&message) {
                    return Err(err);
                }
                if retries >= policy.max_retries {
                    warn!(retries, error = %message, "transient failure, retries exhausted");
                    return Err(err);
                }
                retries += 1;

                let jitter: f64 = rand::thread_rng().gen_range(0.85..=1.15);
                let next_ms = (delay.as_millis() as f64 * 1.5 * jitter) as u64;
                delay = Duration::from_millis(next_ms.min(policy.max_delay.as_millis() as u64));

                warn!(
                    retry = retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %message,
                    "transient failure, backing off"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_retryable_vocabulary() {
        assert!(is_retryable("HTTP 503: service busy"));
        assert!(is_retryable("model overloaded, try later"));
        assert!(is_retryable("gRPC status UNAVAILABLE"));
        assert!(!is_retryable("HTTP 400: bad request"));
        assert!(!is_retryable("unavailable")); // vocabulary is case-exact
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_error_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), String> = run_with_retry(&RetryPolicy::default(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err("HTTP 400: bad request".to_string()) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_then_success() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, String> = run_with_retry(&RetryPolicy::default(), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err("HTTP 503: overloaded".to_string())
                } else {
                    Ok(n)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_exhausted() {
        let policy = RetryPolicy {
            max_retries: 3,
            ..RetryPolicy::default()
        };
        let calls = AtomicU32::new(0);
        let result: Result<(), String> = run_with_retry(&policy, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err("503".to_string()) }
        })
        .await;
        assert!(result.is_err());
        // Initial attempt plus three retries
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_growth_bounded_by_max() {
        // With a tiny max_delay every sleep is clamped; total elapsed time
        // under the paused clock must therefore stay under retries * max.
        let policy = RetryPolicy {
            max_retries: 4,
            initial_delay: Duration::from_millis(2000),
            max_delay: Duration::from_millis(100),
        };
        let start = tokio::time::Instant::now();
        let result: Result<(), String> =
            run_with_retry(&policy, || async { Err("503".to_string()) }).await;
        assert!(result.is_err());
        assert!(start.elapsed() <= Duration::from_millis(4 * 100 + 10));
    }
}
