//! Multi-source aggregation: fan out, normalize, deduplicate, summarize.
//!
//! One call to [`Aggregator::run`] is one pass:
//!
//! ```text
//! Idle -> Running -> Finalizing -> Idle
//! ```
//!
//! While running, every source is asked about every query term (sources
//! concurrently, terms one after another). Source failures and skips are
//! absorbed and counted; only catalog failures abort the pass, in which case
//! no run record is written.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use uuid::Uuid;

use crate::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig};
use crate::dedup::{Admission, Deduplicator};
use crate::error::{AdapterError, AppError};
use crate::identity::JobIdentity;
use crate::models::{Job, RunRecord};
use crate::normalize::normalize;
use crate::retry::RetryPolicy;
use crate::traits::{JobCatalog, JobSource, SearchQuery, SourceOutcome};

/// Lifecycle phase of the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Running,
    Finalizing,
}

/// Events emitted during a pass, for monitoring/logging.
#[derive(Debug, Clone)]
pub enum RunEvent<'a> {
    Started {
        queries: usize,
        sources: usize,
        known_jobs: usize,
    },
    QueryStarted {
        query: &'a str,
    },
    SourceAnswered {
        source: &'a str,
        query: &'a str,
        entries: usize,
    },
    SourceSkipped {
        source: &'a str,
        query: &'a str,
        reason: &'a str,
    },
    SourceFailed {
        source: &'a str,
        query: &'a str,
        error: &'a AdapterError,
    },
    QueryFinished {
        query: &'a str,
        found: usize,
        admitted: usize,
    },
    Finalized {
        run_id: Uuid,
        record: &'a RunRecord,
    },
}

/// Receives [`RunEvent`]s (decoupled logging).
pub trait RunReporter: Send + Sync {
    fn report(&self, event: RunEvent<'_>) {
        let _ = event;
    }
}

/// Reporter that uses the `tracing` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingRunReporter;

impl RunReporter for TracingRunReporter {
    fn report(&self, event: RunEvent<'_>) {
        match event {
            RunEvent::Started {
                queries,
                sources,
                known_jobs,
            } => {
                tracing::info!(%queries, %sources, %known_jobs, "Aggregation run started");
            }
            RunEvent::QueryStarted { query } => {
                tracing::info!(%query, "Searching");
            }
            RunEvent::SourceAnswered {
                source,
                query,
                entries,
            } => {
                tracing::info!(%source, %query, %entries, "Source answered");
            }
            RunEvent::SourceSkipped {
                source,
                query,
                reason,
            } => {
                tracing::info!(%source, %query, %reason, "Source skipped");
            }
            RunEvent::SourceFailed {
                source,
                query,
                error,
            } => {
                tracing::warn!(%source, %query, error = %error.cause, "Source failed");
            }
            RunEvent::QueryFinished {
                query,
                found,
                admitted,
            } => {
                tracing::info!(%query, %found, %admitted, "Query finished");
            }
            RunEvent::Finalized { run_id, record } => {
                tracing::info!(
                    %run_id,
                    jobs_found = record.jobs_found,
                    new_jobs = record.new_jobs,
                    sources = %record.sources_joined(),
                    "Aggregation run complete"
                );
            }
        }
    }
}

/// Tuning for one aggregator.
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    pub location: String,
    pub radius_km: u32,
    /// Upper bound on one source call, pagination and retries excluded.
    pub source_timeout: Duration,
    pub retry: RetryPolicy,
    pub breaker: CircuitBreakerConfig,
}

impl AggregatorConfig {
    pub fn new(location: impl Into<String>, radius_km: u32) -> Self {
        Self {
            location: location.into(),
            radius_km,
            source_timeout: Duration::from_secs(60),
            retry: RetryPolicy::default(),
            breaker: CircuitBreakerConfig::default(),
        }
    }

    pub fn with_source_timeout(mut self, timeout: Duration) -> Self {
        self.source_timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_breaker(mut self, breaker: CircuitBreakerConfig) -> Self {
        self.breaker = breaker;
        self
    }
}

/// Per-source tallies for one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceReport {
    pub name: String,
    /// Raw entries returned.
    pub fetched: usize,
    pub admitted: usize,
    pub duplicates: usize,
    /// Entries dropped by normalization (no title and no company).
    pub discarded: usize,
    /// Query terms for which the source was skipped.
    pub skipped: usize,
    /// Query terms for which the source failed.
    pub failures: usize,
    pub last_error: Option<String>,
}

/// Everything a pass produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub run_id: Uuid,
    pub record: RunRecord,
    /// Newly admitted jobs, in admission order.
    pub new_jobs: Vec<Job>,
    /// One report per configured source, in configuration order.
    pub source_reports: Vec<SourceReport>,
}

/// In-flight accumulator, finalized into a [`RunRecord`] exactly once.
struct RunAccumulator {
    run_at: DateTime<Utc>,
    jobs_found: usize,
    sources_with_results: BTreeSet<String>,
    new_jobs: Vec<Job>,
    reports: Vec<SourceReport>,
}

impl RunAccumulator {
    fn new(source_names: impl IntoIterator<Item = String>) -> Self {
        Self {
            run_at: Utc::now(),
            jobs_found: 0,
            sources_with_results: BTreeSet::new(),
            new_jobs: Vec::new(),
            reports: source_names
                .into_iter()
                .map(|name| SourceReport {
                    name,
                    ..SourceReport::default()
                })
                .collect(),
        }
    }

    fn finish(self, queries_processed: usize) -> (RunRecord, Vec<Job>, Vec<SourceReport>) {
        let record = RunRecord {
            run_at: self.run_at,
            jobs_found: self.jobs_found,
            new_jobs: self.new_jobs.len(),
            queries_processed,
            sources: self.sources_with_results,
        };
        (record, self.new_jobs, self.reports)
    }
}

/// Resets the phase to `Idle` when a pass ends, including on error.
struct PhaseGuard<'a> {
    phase: &'a Mutex<RunPhase>,
}

impl PhaseGuard<'_> {
    fn set(&self, next: RunPhase) {
        *self.phase.lock().unwrap_or_else(|p| p.into_inner()) = next;
    }
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        self.set(RunPhase::Idle);
    }
}

/// Drives every configured source for a list of query terms and admits new
/// jobs into the catalog. The aggregator is the catalog's only writer.
pub struct Aggregator<C: JobCatalog> {
    sources: Vec<Arc<dyn JobSource>>,
    catalog: C,
    config: AggregatorConfig,
    phase: Mutex<RunPhase>,
}

impl<C: JobCatalog> Aggregator<C> {
    pub fn new(catalog: C, config: AggregatorConfig) -> Self {
        Self {
            sources: Vec::new(),
            catalog,
            config,
            phase: Mutex::new(RunPhase::Idle),
        }
    }

    pub fn with_source(mut self, source: impl JobSource + 'static) -> Self {
        self.sources.push(Arc::new(source));
        self
    }

    pub fn with_sources(mut self, sources: impl IntoIterator<Item = Arc<dyn JobSource>>) -> Self {
        self.sources.extend(sources);
        self
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    pub fn phase(&self) -> RunPhase {
        *self.phase.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn enter_running(&self) -> Result<PhaseGuard<'_>, AppError> {
        let mut phase = self.phase.lock().unwrap_or_else(|p| p.into_inner());
        if *phase != RunPhase::Idle {
            return Err(AppError::Generic(format!(
                "aggregation already in progress (phase {phase:?})"
            )));
        }
        *phase = RunPhase::Running;
        Ok(PhaseGuard { phase: &self.phase })
    }

    /// Run one aggregation pass over `queries`.
    ///
    /// Returns `Err` only when the catalog fails; the run record is then
    /// not written.
    pub async fn run<R: RunReporter>(
        &self,
        queries: &[String],
        reporter: &R,
    ) -> Result<RunOutcome, AppError> {
        let guard = self.enter_running()?;

        let dedup = Deduplicator::load(self.catalog.clone()).await?;
        reporter.report(RunEvent::Started {
            queries: queries.len(),
            sources: self.sources.len(),
            known_jobs: dedup.known().await,
        });

        // Breakers live for one pass only.
        let breakers: Vec<CircuitBreaker> = self
            .sources
            .iter()
            .map(|s| CircuitBreaker::new(s.name(), self.config.breaker.clone()))
            .collect();

        let mut acc = RunAccumulator::new(self.sources.iter().map(|s| s.name().to_string()));

        for term in queries {
            reporter.report(RunEvent::QueryStarted { query: term });
            let query = SearchQuery::new(term.as_str(), &self.config.location, self.config.radius_km);

            let outcomes = join_all(
                self.sources
                    .iter()
                    .zip(&breakers)
                    .map(|(source, breaker)| self.call_source(source.as_ref(), breaker, &query)),
            )
            .await;

            let mut found = 0;
            let mut admitted = 0;
            for (idx, outcome) in outcomes.into_iter().enumerate() {
                let name = self.sources[idx].name();
                match outcome {
                    SourceOutcome::Entries(entries) => {
                        reporter.report(RunEvent::SourceAnswered {
                            source: name,
                            query: term,
                            entries: entries.len(),
                        });
                        found += entries.len();
                        acc.jobs_found += entries.len();
                        acc.reports[idx].fetched += entries.len();
                        if !entries.is_empty() {
                            acc.sources_with_results.insert(name.to_string());
                        }

                        for raw in &entries {
                            let Some(job) = normalize(raw, name, term) else {
                                acc.reports[idx].discarded += 1;
                                continue;
                            };
                            let identity = JobIdentity::of(&job);
                            match dedup.admit(&job, &identity).await? {
                                Admission::Admitted => {
                                    admitted += 1;
                                    acc.reports[idx].admitted += 1;
                                    acc.new_jobs.push(job);
                                }
                                Admission::Duplicate => acc.reports[idx].duplicates += 1,
                            }
                        }
                    }
                    SourceOutcome::Skipped { reason } => {
                        reporter.report(RunEvent::SourceSkipped {
                            source: name,
                            query: term,
                            reason: &reason,
                        });
                        acc.reports[idx].skipped += 1;
                    }
                    SourceOutcome::Failed(error) => {
                        reporter.report(RunEvent::SourceFailed {
                            source: name,
                            query: term,
                            error: &error,
                        });
                        acc.reports[idx].failures += 1;
                        acc.reports[idx].last_error = Some(error.cause.to_string());
                    }
                }
            }

            reporter.report(RunEvent::QueryFinished {
                query: term,
                found,
                admitted,
            });
        }

        guard.set(RunPhase::Finalizing);
        let (record, new_jobs, source_reports) = acc.finish(queries.len());
        let run_id = self.catalog.record_run(&record).await?;
        reporter.report(RunEvent::Finalized {
            run_id,
            record: &record,
        });

        Ok(RunOutcome {
            run_id,
            record,
            new_jobs,
            source_reports,
        })
    }

    /// One source call wrapped in breaker, retry policy and deadline.
    async fn call_source(
        &self,
        source: &dyn JobSource,
        breaker: &CircuitBreaker,
        query: &SearchQuery,
    ) -> SourceOutcome {
        let name = source.name();
        let deadline = self.config.source_timeout;
        breaker
            .call(|| {
                self.config.retry.run(name, || async move {
                    match tokio::time::timeout(deadline, source.fetch(query)).await {
                        Ok(outcome) => outcome,
                        Err(_) => {
                            SourceOutcome::failed(name, AppError::Timeout(whole_seconds(deadline)))
                        }
                    }
                })
            })
            .await
    }
}

/// Deadline in whole seconds, rounded up so sub-second deadlines never read as 0.
fn whole_seconds(deadline: Duration) -> u64 {
    deadline.as_secs() + u64::from(deadline.subsec_nanos() > 0)
}

/// Count admitted jobs per source name, in first-seen order.
pub fn jobs_by_source(jobs: &[Job]) -> Vec<(&str, Vec<&Job>)> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&Job>> = HashMap::new();
    for job in jobs {
        let entry = groups.entry(job.source.as_str()).or_insert_with(|| {
            order.push(job.source.as_str());
            Vec::new()
        });
        entry.push(job);
    }
    order
        .into_iter()
        .map(|name| (name, groups.remove(name).unwrap_or_default()))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use super::*;
    use crate::catalog::MemoryCatalog;
    use crate::models::RawEntry;
    use crate::testutil::{FailingCatalog, MockSource};

    fn config() -> AggregatorConfig {
        AggregatorConfig::new("Willow Grove, PA 19090", 64)
            .with_source_timeout(Duration::from_millis(200))
            .with_retry(RetryPolicy::none())
    }

    fn queries(terms: &[&str]) -> Vec<String> {
        terms.iter().map(|t| t.to_string()).collect()
    }

    fn pm(company: &str) -> RawEntry {
        RawEntry::new("Product Manager", company)
    }

    #[tokio::test]
    async fn second_run_admits_nothing_new() {
        let catalog = MemoryCatalog::new();
        let entries = vec![pm("Acme"), pm("Globex"), pm("Initech")];
        let agg = Aggregator::new(catalog.clone(), config())
            .with_source(MockSource::returning("A", entries));

        let first = agg.run(&queries(&["pm"]), &TracingRunReporter).await.unwrap();
        assert_eq!(first.record.new_jobs, 3);
        assert_eq!(first.new_jobs.len(), 3);
        assert_eq!(catalog.job_count().await.unwrap(), 3);

        let second = agg.run(&queries(&["pm"]), &TracingRunReporter).await.unwrap();
        assert_eq!(second.record.new_jobs, 0);
        assert_eq!(second.record.jobs_found, 3);
        assert!(second.new_jobs.is_empty());
        assert_eq!(catalog.job_count().await.unwrap(), 3);

        // Every pass appends a run record.
        assert_eq!(catalog.runs().len(), 2);
    }

    #[tokio::test]
    async fn timing_out_source_does_not_hide_other_sources() {
        let agg = Aggregator::new(MemoryCatalog::new(), config())
            .with_source(MockSource::hanging("Slow"))
            .with_source(MockSource::failing("Flaky", || AppError::Timeout(15)))
            .with_source(MockSource::returning("Healthy", vec![pm("Acme")]));

        let outcome = agg
            .run(&queries(&["pm", "po"]), &TracingRunReporter)
            .await
            .unwrap();

        assert_eq!(outcome.record.new_jobs, 1);
        assert_eq!(outcome.new_jobs[0].source, "Healthy");
        assert_eq!(outcome.source_reports[0].failures, 2);
        assert_eq!(outcome.source_reports[1].failures, 2);
        assert!(
            outcome.source_reports[0]
                .last_error
                .as_deref()
                .unwrap()
                .contains("timed out after 1 seconds")
        );
        assert_eq!(
            outcome.record.sources,
            BTreeSet::from(["Healthy".to_string()])
        );
    }

    #[tokio::test]
    async fn same_listing_from_two_sources_is_admitted_twice() {
        let agg = Aggregator::new(MemoryCatalog::new(), config())
            .with_source(MockSource::returning("A", vec![pm("Acme")]))
            .with_source(MockSource::returning("B", vec![pm("Acme")]));

        let outcome = agg.run(&queries(&["pm"]), &TracingRunReporter).await.unwrap();

        assert_eq!(outcome.new_jobs.len(), 2);
        let sources: Vec<_> = outcome.new_jobs.iter().map(|j| j.source.as_str()).collect();
        assert_eq!(sources, ["A", "B"]);
    }

    #[tokio::test]
    async fn pagination_overlap_admits_once() {
        let agg = Aggregator::new(MemoryCatalog::new(), config())
            .with_source(MockSource::returning("A", vec![pm("Acme"), pm("Acme")]));

        let outcome = agg.run(&queries(&["pm"]), &TracingRunReporter).await.unwrap();

        assert_eq!(outcome.new_jobs.len(), 1);
        assert_eq!(outcome.record.new_jobs, 1);
        assert_eq!(outcome.record.jobs_found, 2);
        assert_eq!(outcome.source_reports[0].duplicates, 1);
    }

    #[tokio::test]
    async fn seeded_identity_is_not_new() {
        let seeded = normalize(&RawEntry::new("Senior PM", "Acme"), "A", "earlier").unwrap();
        let agg = Aggregator::new(MemoryCatalog::seeded([seeded]), config())
            .with_source(MockSource::returning("A", vec![RawEntry::new("Senior PM", "Acme")]));

        let outcome = agg.run(&queries(&["pm"]), &TracingRunReporter).await.unwrap();

        assert_eq!(outcome.record.new_jobs, 0);
        assert_eq!(outcome.record.jobs_found, 1);
    }

    #[tokio::test]
    async fn total_outage_still_records_a_run() {
        let catalog = MemoryCatalog::new();
        let agg = Aggregator::new(catalog.clone(), config())
            .with_source(MockSource::failing("A", || AppError::NetworkError("down".into())))
            .with_source(MockSource::skipping("B", "ADZUNA_APP_ID not set"));

        let outcome = agg.run(&queries(&["pm"]), &TracingRunReporter).await.unwrap();

        assert_eq!(outcome.record.new_jobs, 0);
        assert_eq!(outcome.record.jobs_found, 0);
        assert_eq!(outcome.record.queries_processed, 1);
        assert!(outcome.record.sources.is_empty());
        assert_eq!(outcome.source_reports[1].skipped, 1);
        assert_eq!(catalog.runs().len(), 1);
    }

    #[tokio::test]
    async fn admit_failure_aborts_without_run_record() {
        let catalog = FailingCatalog::failing_admit();
        let agg = Aggregator::new(catalog.clone(), config())
            .with_source(MockSource::returning("A", vec![pm("Acme")]));

        let err = agg
            .run(&queries(&["pm"]), &TracingRunReporter)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::DatabaseError(_)));
        assert!(catalog.inner().runs().is_empty());
        assert_eq!(agg.phase(), RunPhase::Idle);
    }

    #[tokio::test]
    async fn record_failure_propagates() {
        let agg = Aggregator::new(FailingCatalog::failing_record_run(), config())
            .with_source(MockSource::returning("A", vec![pm("Acme")]));

        let err = agg
            .run(&queries(&["pm"]), &TracingRunReporter)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DatabaseError(_)));
    }

    #[tokio::test]
    async fn discarded_entries_count_as_found_but_not_admitted() {
        let blank = RawEntry {
            title: Some(" ".into()),
            company: None,
            ..RawEntry::default()
        };
        let agg = Aggregator::new(MemoryCatalog::new(), config())
            .with_source(MockSource::returning("A", vec![blank, pm("Acme")]));

        let outcome = agg.run(&queries(&["pm"]), &TracingRunReporter).await.unwrap();

        assert_eq!(outcome.record.jobs_found, 2);
        assert_eq!(outcome.record.new_jobs, 1);
        assert_eq!(outcome.source_reports[0].discarded, 1);
    }

    #[tokio::test]
    async fn jobs_carry_the_query_that_found_them() {
        let source = MockSource::returning("A", vec![pm("Acme")]);
        let agg = Aggregator::new(MemoryCatalog::new(), config()).with_source(source.clone());

        let outcome = agg
            .run(&queries(&["Digital Product Owner", "Growth Architect"]), &TracingRunReporter)
            .await
            .unwrap();

        assert_eq!(outcome.new_jobs.len(), 1);
        assert_eq!(outcome.new_jobs[0].query, "Digital Product Owner");
        assert_eq!(outcome.record.queries_processed, 2);

        let seen = source.queries();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].location, "Willow Grove, PA 19090");
        assert_eq!(seen[0].radius_km, 64);
    }

    #[tokio::test]
    async fn open_circuit_stops_calling_failing_source() {
        let failing = MockSource::failing("A", || AppError::Timeout(15));
        let cfg = config().with_breaker(CircuitBreakerConfig {
            failure_threshold: 2,
            recovery_timeout: Duration::from_secs(600),
        });
        let agg = Aggregator::new(MemoryCatalog::new(), cfg).with_source(failing.clone());

        let outcome = agg
            .run(&queries(&["a", "b", "c", "d"]), &TracingRunReporter)
            .await
            .unwrap();

        assert_eq!(failing.call_count(), 2);
        assert_eq!(outcome.source_reports[0].failures, 4);
    }

    #[tokio::test]
    async fn retries_apply_per_source_call() {
        let flaky = MockSource::with_script(
            "A",
            vec![
                crate::testutil::Script::Fail(|| AppError::NetworkError("reset".into())),
                crate::testutil::Script::Entries(vec![pm("Acme")]),
            ],
        );
        let cfg = config().with_retry(RetryPolicy::new(2, Duration::ZERO));
        let agg = Aggregator::new(MemoryCatalog::new(), cfg).with_source(flaky.clone());

        let outcome = agg.run(&queries(&["pm"]), &TracingRunReporter).await.unwrap();

        assert_eq!(outcome.record.new_jobs, 1);
        assert_eq!(flaky.call_count(), 2);
    }

    #[derive(Default)]
    struct RecordingReporter {
        events: StdMutex<Vec<String>>,
    }

    impl RunReporter for RecordingReporter {
        fn report(&self, event: RunEvent<'_>) {
            let label = match event {
                RunEvent::Started { .. } => "started".to_string(),
                RunEvent::QueryStarted { query } => format!("query:{query}"),
                RunEvent::SourceAnswered { source, .. } => format!("answered:{source}"),
                RunEvent::SourceSkipped { source, .. } => format!("skipped:{source}"),
                RunEvent::SourceFailed { source, .. } => format!("failed:{source}"),
                RunEvent::QueryFinished { .. } => "query_done".to_string(),
                RunEvent::Finalized { .. } => "finalized".to_string(),
            };
            self.events.lock().unwrap().push(label);
        }
    }

    #[tokio::test]
    async fn reports_lifecycle_events_in_order() {
        let agg = Aggregator::new(MemoryCatalog::new(), config())
            .with_source(MockSource::returning("A", vec![pm("Acme")]))
            .with_source(MockSource::skipping("B", "no key"));
        let reporter = RecordingReporter::default();

        agg.run(&queries(&["pm"]), &reporter).await.unwrap();

        let events = reporter.events.lock().unwrap().clone();
        assert_eq!(
            events,
            [
                "started",
                "query:pm",
                "answered:A",
                "skipped:B",
                "query_done",
                "finalized"
            ]
        );
        assert_eq!(agg.phase(), RunPhase::Idle);
    }

    #[test]
    fn groups_jobs_by_source_in_first_seen_order() {
        let jobs: Vec<Job> = [("PM", "B"), ("PO", "A"), ("TPM", "B")]
            .iter()
            .map(|(title, source)| normalize(&RawEntry::new(*title, "Acme"), source, "q").unwrap())
            .collect();

        let groups = jobs_by_source(&jobs);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "B");
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].0, "A");
    }

    #[test]
    fn sub_second_deadlines_round_up() {
        assert_eq!(whole_seconds(Duration::from_millis(200)), 1);
        assert_eq!(whole_seconds(Duration::from_secs(60)), 60);
        assert_eq!(whole_seconds(Duration::from_millis(1500)), 2);
    }

    #[test]
    fn source_names_follow_configuration_order() {
        let agg = Aggregator::new(MemoryCatalog::new(), config())
            .with_source(MockSource::returning("B", Vec::new()))
            .with_source(MockSource::skipping("A", "no key"));
        assert_eq!(agg.source_names(), ["B", "A"]);
    }
}
