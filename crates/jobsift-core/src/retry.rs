use std::future::Future;
use std::time::Duration;

use crate::traits::SourceOutcome;

/// Bounded retry with a fixed pause, applied at the source boundary.
///
/// Only [`SourceOutcome::Failed`] outcomes whose cause is retryable are
/// retried; skips and successful answers (even empty ones) return at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first. `1` disables retries.
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            backoff: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// A policy that calls exactly once.
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    pub async fn run<F, Fut>(&self, source_name: &str, mut op: F) -> SourceOutcome
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = SourceOutcome>,
    {
        let mut attempt = 1;
        loop {
            let outcome = op().await;
            match &outcome {
                SourceOutcome::Failed(err) if err.is_retryable() && attempt < self.max_attempts => {
                    tracing::warn!(
                        source = %source_name,
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %err.cause,
                        "Source call failed, retrying"
                    );
                    if !self.backoff.is_zero() {
                        tokio::time::sleep(self.backoff).await;
                    }
                    attempt += 1;
                }
                _ => return outcome,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::error::AppError;
    use crate::models::RawEntry;

    #[tokio::test]
    async fn retries_transient_failures_until_success() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(3, Duration::ZERO);

        let outcome = policy
            .run("Adzuna", || async {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    SourceOutcome::failed("Adzuna", AppError::Timeout(15))
                } else {
                    SourceOutcome::Entries(vec![RawEntry::new("PM", "Acme")])
                }
            })
            .await;

        assert!(matches!(outcome, SourceOutcome::Entries(ref e) if e.len() == 1));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(3, Duration::ZERO);

        let outcome = policy
            .run("JSearch", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                SourceOutcome::failed("JSearch", AppError::NetworkError("reset".into()))
            })
            .await;

        assert!(matches!(outcome, SourceOutcome::Failed(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn permanent_failures_are_not_retried() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(5, Duration::ZERO);

        policy
            .run("Adzuna", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                SourceOutcome::failed("Adzuna", AppError::HttpError("HTTP 401 for x".into()))
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn skips_are_not_retried() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(5, Duration::ZERO);

        let outcome = policy
            .run("Google Jobs", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                SourceOutcome::skipped("SERP_API_KEY not set")
            })
            .await;

        assert!(matches!(outcome, SourceOutcome::Skipped { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn zero_attempts_clamps_to_one() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts, 1);
        assert_eq!(RetryPolicy::none().max_attempts, 1);
    }
}
