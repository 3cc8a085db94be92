//! Opt-in retry with exponential backoff.
//!
//! Nothing in the client retries on its own. A [`RetryPolicy`] with
//! `max_retries == 0` (the default) runs an operation exactly once.

use std::future::Future;
use std::time::Duration;

use rand::Rng;

use crate::error::TripPinError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: usize,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_millis(8000),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self::default()
    }

    /// Backoff before retry number `attempt` (1-based), with +/-20% jitter.
    pub fn delay_for_attempt(&self, attempt: usize) -> Duration {
        let shift = (attempt.saturating_sub(1)).min(30) as u32;
        let exp = 1u32 << shift;
        let base = self.base_delay.saturating_mul(exp).min(self.max_delay);
        let jitter = rand::thread_rng().gen_range(0.8..1.2);
        base.mul_f64(jitter)
    }

    /// Runs `f`, retrying transient failures up to `max_retries` times.
    pub async fn run<T, F, Fut>(&self, label: &str, mut f: F) -> Result<T, TripPinError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, TripPinError>>,
    {
        let mut attempt = 0usize;
        loop {
            match f().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    attempt += 1;
                    if attempt > self.max_retries || !is_retryable(&err) {
                        return Err(err);
                    }
                    let delay = self.delay_for_attempt(attempt);
                    tracing::warn!(
                        "{} request failed (attempt {}/{}), retrying in {:.1}s",
                        label,
                        attempt,
                        self.max_retries,
                        delay.as_secs_f64()
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

/// Transport failures, throttling and server errors are worth retrying;
/// everything else would fail the same way again.
pub fn is_retryable(err: &TripPinError) -> bool {
    match err.api() {
        Some(trippin_api::Error::ServiceUnavailable(_)) => true,
        Some(trippin_api::Error::HttpStatus { status, .. }) => *status == 429 || *status >= 500,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn unavailable() -> TripPinError {
        TripPinError::Api(trippin_api::Error::ServiceUnavailable("refused".to_string()))
    }

    #[test]
    fn test_delay_is_capped() {
        let policy = RetryPolicy {
            max_retries: 5,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(300),
        };
        assert!(policy.delay_for_attempt(1) <= Duration::from_millis(120));
        assert!(policy.delay_for_attempt(10) <= Duration::from_millis(360));
        assert!(policy.delay_for_attempt(10) >= Duration::from_millis(240));
    }

    #[test]
    fn test_retryable_classification() {
        assert!(is_retryable(&unavailable()));
        assert!(is_retryable(&TripPinError::Api(trippin_api::Error::HttpStatus {
            status: 503,
            body: String::new(),
        })));
        assert!(!is_retryable(&TripPinError::Api(trippin_api::Error::HttpStatus {
            status: 400,
            body: String::new(),
        })));
        assert!(!is_retryable(&TripPinError::Api(trippin_api::Error::EntityNotFound {
            entity_set: "People",
            key: "'x'".to_string(),
        })));
        assert!(!is_retryable(&TripPinError::InvalidInput("x".to_string())));
    }

    #[tokio::test]
    async fn test_default_policy_runs_once() {
        let calls = AtomicUsize::new(0);
        let result: Result<(), _> = RetryPolicy::none()
            .run("test", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(unavailable())
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_until_success() {
        let calls = AtomicUsize::new(0);
        let policy = RetryPolicy {
            max_retries: 3,
            ..RetryPolicy::default()
        };
        let result = policy
            .run("test", || async {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(unavailable())
                } else {
                    Ok(42)
                }
            })
            .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_stops_immediately() {
        let calls = AtomicUsize::new(0);
        let policy = RetryPolicy {
            max_retries: 3,
            ..RetryPolicy::default()
        };
        let result: Result<(), _> = policy
            .run("test", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(TripPinError::InvalidInput("bad".to_string()))
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
