//! # Contention Retry
//!
//! Runs a transactional closure again when SQLite reports BUSY or LOCKED.
//!
//! ```text
//! attempt 1 ──► Busy ──► sleep ~25ms ──► attempt 2 ──► Busy ──► sleep ~50ms
//!     ──► attempt 3 ──► Ok(value)
//!
//! attempt N == max_attempts and still Busy ──► DbError::Conflict
//! any other error                           ──► returned immediately
//! ```
//!
//! Each attempt owns its own `sqlx::Transaction`. A failed attempt drops it,
//! which rolls back, so a retry always starts from committed state.

use std::future::Future;
use std::time::Duration;

use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};

/// Bounded exponential backoff with jitter.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Minimum 1.
    pub max_attempts: u32,
    /// Delay before the second attempt (before jitter).
    pub initial_interval: Duration,
    /// Upper bound for a single delay.
    pub max_interval: Duration,
    /// Delay growth factor between attempts.
    pub multiplier: f64,
    /// Jitter: each delay is drawn from `interval × [1 − f, 1 + f]`.
    pub randomization_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 8,
            initial_interval: Duration::from_millis(25),
            max_interval: Duration::from_secs(1),
            multiplier: 2.0,
            randomization_factor: 0.5,
        }
    }
}

impl RetryPolicy {
    /// Sets the attempt bound.
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Sets the first delay.
    pub fn initial_interval(mut self, interval: Duration) -> Self {
        self.initial_interval = interval;
        self
    }

    /// Sets the delay cap.
    pub fn max_interval(mut self, interval: Duration) -> Self {
        self.max_interval = interval;
        self
    }

    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: self.initial_interval,
            current_interval: self.initial_interval,
            max_interval: self.max_interval,
            multiplier: self.multiplier,
            randomization_factor: self.randomization_factor,
            // Attempts are bounded by count, not elapsed time
            max_elapsed_time: None,
            ..Default::default()
        }
    }
}

/// Runs `attempt` until it succeeds, fails with a non-retryable error, or
/// the policy's attempt bound is reached.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, operation: &str, mut attempt: F) -> DbResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = DbResult<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut backoff = policy.backoff();
    let mut tries = 0u32;

    loop {
        tries += 1;

        match attempt().await {
            Ok(value) => {
                if tries > 1 {
                    debug!(operation, attempts = tries, "Succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) if e.is_retryable() => {
                if tries >= max_attempts {
                    warn!(operation, attempts = tries, error = %e, "Retries exhausted");
                    return Err(DbError::Conflict(format!(
                        "{} did not complete after {} attempts under contention",
                        operation, tries
                    )));
                }

                let delay = backoff.next_backoff().unwrap_or(policy.max_interval);
                warn!(operation, attempt = tries, ?delay, error = %e, "Store busy, retrying");
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use vorca_core::ErrorKind;

    fn fast_policy(attempts: u32) -> RetryPolicy {
        RetryPolicy::default()
            .max_attempts(attempts)
            .initial_interval(Duration::from_millis(1))
            .max_interval(Duration::from_millis(2))
    }

    #[tokio::test]
    async fn test_retries_busy_then_succeeds() {
        let calls = &AtomicU32::new(0);

        let result = with_retry(&fast_policy(5), "test", move || async move {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                Err(DbError::Busy("database is locked".to_string()))
            } else {
                Ok(n)
            }
        })
        .await
        .unwrap();

        assert_eq!(result, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhaustion_is_conflict() {
        let calls = &AtomicU32::new(0);

        let err = with_retry(&fast_policy(3), "test", move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(DbError::Busy("database is locked".to_string()))
        })
        .await
        .unwrap_err();

        assert!(matches!(err, DbError::Conflict(_)));
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_errors_return_immediately() {
        let calls = &AtomicU32::new(0);

        let err = with_retry(&fast_policy(5), "test", move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(DbError::not_found("Product", "p-1"))
        })
        .await
        .unwrap_err();

        assert!(matches!(err, DbError::NotFound { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
