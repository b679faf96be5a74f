//! Per-source circuit breaker.
//!
//! A source that keeps timing out would otherwise cost one full timeout per
//! query term (times retries). Once it fails `failure_threshold` times in a
//! row its breaker opens and further calls are short-circuited into
//! [`SourceOutcome::Failed`] until the recovery timeout elapses.
//!
//! ```text
//! CLOSED --[N failures]--> OPEN --[recovery timeout]--> HALF_OPEN
//!   ^                       ^                              |
//!   |                       +--------[probe fails]---------+
//!   +-------------------------[probe succeeds]-------------+
//! ```

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::error::AppError;
use crate::traits::SourceOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CircuitState::Closed => write!(f, "closed"),
            CircuitState::Open => write!(f, "open"),
            CircuitState::HalfOpen => write!(f, "half-open"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive tripping failures before the circuit opens.
    pub failure_threshold: u32,
    /// Time spent open before a single probe call is let through.
    pub recovery_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            recovery_timeout: Duration::from_secs(300),
        }
    }
}

#[derive(Debug)]
struct Inner {
    state: CircuitState,
    failure_count: u32,
    opened_at: Option<Instant>,
}

/// Thread-safe breaker guarding calls to one source. Clones share state.
#[derive(Debug, Clone)]
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    inner: Arc<Mutex<Inner>>,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            inner: Arc::new(Mutex::new(Inner {
                state: CircuitState::Closed,
                failure_count: 0,
                opened_at: None,
            })),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn lock_inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| {
            tracing::warn!(circuit = %self.name, "Recovered from poisoned mutex");
            poisoned.into_inner()
        })
    }

    /// Current state, applying the lazy Open -> HalfOpen transition.
    pub fn state(&self) -> CircuitState {
        let mut inner = self.lock_inner();
        self.maybe_half_open(&mut inner);
        inner.state
    }

    /// Run `op` unless the circuit is open, and feed its outcome back.
    pub async fn call<F, Fut>(&self, op: F) -> SourceOutcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = SourceOutcome>,
    {
        if let Some(retry_after) = self.rejection() {
            return SourceOutcome::failed(
                &self.name,
                AppError::Generic(format!(
                    "circuit open, retry after {}s",
                    retry_after.as_secs()
                )),
            );
        }

        let outcome = op().await;
        match &outcome {
            SourceOutcome::Entries(_) => self.record_success(),
            SourceOutcome::Failed(err) if err.cause.should_trip_circuit() => {
                self.record_failure(&err.cause)
            }
            SourceOutcome::Failed(_) | SourceOutcome::Skipped { .. } => {}
        }
        outcome
    }

    /// Remaining open time if calls are currently rejected.
    fn rejection(&self) -> Option<Duration> {
        let mut inner = self.lock_inner();
        self.maybe_half_open(&mut inner);
        if inner.state != CircuitState::Open {
            return None;
        }
        let elapsed = inner.opened_at.map(|t| t.elapsed()).unwrap_or_default();
        Some(self.config.recovery_timeout.saturating_sub(elapsed))
    }

    pub fn record_success(&self) {
        let mut inner = self.lock_inner();
        if inner.state == CircuitState::HalfOpen {
            tracing::info!(circuit = %self.name, "Circuit closing after successful probe");
        }
        inner.state = CircuitState::Closed;
        inner.failure_count = 0;
        inner.opened_at = None;
    }

    pub fn record_failure(&self, error: &AppError) {
        let mut inner = self.lock_inner();
        match inner.state {
            CircuitState::Closed => {
                inner.failure_count += 1;
                if inner.failure_count >= self.config.failure_threshold {
                    tracing::warn!(
                        circuit = %self.name,
                        failures = inner.failure_count,
                        error = %error,
                        "Circuit opening after consecutive failures"
                    );
                    inner.state = CircuitState::Open;
                    inner.opened_at = Some(Instant::now());
                }
            }
            CircuitState::HalfOpen => {
                tracing::warn!(circuit = %self.name, error = %error, "Probe failed, reopening circuit");
                inner.state = CircuitState::Open;
                inner.opened_at = Some(Instant::now());
            }
            CircuitState::Open => {}
        }
    }

    fn maybe_half_open(&self, inner: &mut Inner) {
        if inner.state == CircuitState::Open
            && let Some(opened_at) = inner.opened_at
            && opened_at.elapsed() >= self.config.recovery_timeout
        {
            tracing::info!(circuit = %self.name, "Circuit half-open, allowing a probe");
            inner.state = CircuitState::HalfOpen;
        }
    }
}
