// src/core/retry.rs
//! Retry an async operation with exponential backoff

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);

const EMPTY_RESULT: &str = "Operation returned null or undefined";

#[derive(Debug, Error, PartialEq)]
pub enum RetryError {
    #[error("Operation failed after {attempts} attempts: {last_error}")]
    Exhausted { attempts: u32, last_error: String },

    #[error("Operation must be attempted at least once")]
    InvalidAttempts,
}

/// Run `operation` up to `max_retries` times.
///
/// `Ok(None)` is a failure just like `Err`. Before attempt `i + 1` the loop
/// sleeps `base_delay * 2^i`; there is no sleep after the final attempt.
pub async fn retry_operation<T, E, F, Fut>(
    mut operation: F,
    max_retries: u32,
    base_delay: Duration,
) -> Result<T, RetryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
    E: Display,
{
    if max_retries == 0 {
        return Err(RetryError::InvalidAttempts);
    }

    let mut last_error = String::from("Unknown error");

    for attempt in 0..max_retries {
        match operation().await {
            Ok(Some(value)) => return Ok(value),
            Ok(None) => last_error = EMPTY_RESULT.to_string(),
            Err(e) => last_error = e.to_string(),
        }

        warn!("Retry attempt {} failed: {}", attempt + 1, last_error);

        if attempt + 1 < max_retries {
            tokio::time::sleep(backoff_delay(base_delay, attempt)).await;
        }
    }

    Err(RetryError::Exhausted {
        attempts: max_retries,
        last_error,
    })
}

/// `base_delay * 2^attempt`, saturating at `Duration::MAX`
fn backoff_delay(base_delay: Duration, attempt: u32) -> Duration {
    if base_delay.is_zero() {
        return Duration::ZERO;
    }
    2u32.checked_pow(attempt)
        .and_then(|factor| base_delay.checked_mul(factor))
        .unwrap_or(Duration::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_always_failing_operation_runs_n_times() {
        for n in 1..=5u32 {
            let calls = Arc::new(AtomicU32::new(0));
            let counter = calls.clone();

            let result: Result<u32, RetryError> = retry_operation(
                || {
                    let counter = counter.clone();
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        Err::<Option<u32>, _>("backend down")
                    }
                },
                n,
                Duration::from_millis(10),
            )
            .await;

            assert_eq!(calls.load(Ordering::SeqCst), n);
            let message = result.unwrap_err().to_string();
            assert!(message.contains(&n.to_string()), "{}", message);
            assert!(message.contains("backend down"));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_none_counts_as_failure() {
        let result: Result<String, RetryError> = retry_operation(
            || async { Ok::<_, String>(None) },
            2,
            Duration::from_millis(10),
        )
        .await;

        assert_eq!(
            result.unwrap_err(),
            RetryError::Exhausted {
                attempts: 2,
                last_error: EMPTY_RESULT.to_string(),
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_failures_with_exponential_delay() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let started = Instant::now();

        let value = retry_operation(
            || {
                let counter = counter.clone();
                async move {
                    let n = counter.fetch_add(1, Ordering::SeqCst);
                    if n < 2 {
                        Err("not yet".to_string())
                    } else {
                        Ok(Some("summary"))
                    }
                }
            },
            3,
            Duration::from_millis(1000),
        )
        .await
        .unwrap();

        assert_eq!(value, "summary");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 1000ms + 2000ms of backoff
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(3000), "{:?}", elapsed);
        assert!(elapsed < Duration::from_millis(3100), "{:?}", elapsed);
    }

    #[test]
    fn test_backoff_delay_saturates() {
        let base = Duration::from_millis(1000);
        assert_eq!(backoff_delay(base, 0), base);
        assert_eq!(backoff_delay(base, 3), Duration::from_millis(8000));
        assert_eq!(backoff_delay(base, 31), base * 2u32.pow(31));
        assert_eq!(backoff_delay(base, 32), Duration::MAX);
        assert_eq!(backoff_delay(base, 40), Duration::MAX);
        assert_eq!(backoff_delay(Duration::MAX, 1), Duration::MAX);
        assert_eq!(backoff_delay(Duration::ZERO, 40), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_many_attempts_without_delay_do_not_overflow() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: Result<u32, RetryError> = retry_operation(
            || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, String>(None)
                }
            },
            40,
            Duration::ZERO,
        )
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 40);
        assert!(matches!(result, Err(RetryError::Exhausted { attempts: 40, .. })));
    }

    #[tokio::test]
    async fn test_zero_attempts_is_rejected() {
        let result: Result<u8, RetryError> =
            retry_operation(|| async { Ok::<_, String>(Some(1)) }, 0, Duration::ZERO).await;
        assert_eq!(result.unwrap_err(), RetryError::InvalidAttempts);
    }
}
