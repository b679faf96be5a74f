//! Periodic polling: one aggregation pass per interval until cancelled.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::aggregate::{Aggregator, RunOutcome, RunReporter};
use crate::traits::JobCatalog;

#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Pause between the end of one pass and the start of the next.
    pub interval: Duration,
    /// Stop after this many attempted passes. `None` polls until cancelled.
    pub max_runs: Option<u32>,
}

impl PollerConfig {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            max_runs: None,
        }
    }

    pub fn with_max_runs(mut self, max_runs: u32) -> Self {
        self.max_runs = Some(max_runs);
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollSummary {
    pub runs_completed: u32,
    pub runs_failed: u32,
}

/// Run aggregation passes on a fixed interval.
///
/// Cancellation is observed between passes and during the wait, never in
/// the middle of a pass. A pass that fails (catalog unavailable) is logged
/// and the loop carries on with the next interval. `on_outcome` sees every
/// completed pass.
pub async fn poll<C, R, F>(
    aggregator: &Aggregator<C>,
    queries: &[String],
    config: &PollerConfig,
    cancel: CancellationToken,
    reporter: &R,
    mut on_outcome: F,
) -> PollSummary
where
    C: JobCatalog,
    R: RunReporter,
    F: FnMut(&RunOutcome),
{
    let mut summary = PollSummary::default();
    tracing::info!(interval_secs = config.interval.as_secs(), "Polling started");

    loop {
        if cancel.is_cancelled() {
            break;
        }

        // Never raced against `cancel`: admitted jobs need their run record.
        // Each source call is bounded by the source timeout.
        match aggregator.run(queries, reporter).await {
            Ok(outcome) => {
                summary.runs_completed += 1;
                on_outcome(&outcome);
            }
            Err(e) => {
                summary.runs_failed += 1;
                tracing::error!(error = %e, "Aggregation pass failed");
            }
        }

        let attempted = summary.runs_completed + summary.runs_failed;
        if config.max_runs.is_some_and(|max| attempted >= max) {
            break;
        }

        tokio::select! {
            () = tokio::time::sleep(config.interval) => {}
            () = cancel.cancelled() => break,
        }
    }

    tracing::info!(
        completed = summary.runs_completed,
        failed = summary.runs_failed,
        "Polling stopped"
    );
    summary
}
