//! Test utilities: mock implementations of the core traits.
//!
//! Handwritten mocks for dependency injection in unit tests.
//! All mocks use `Arc<Mutex<_>>` for interior mutability, allowing
//! test assertions on recorded calls.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use crate::catalog::MemoryCatalog;
use crate::error::AppError;
use crate::identity::JobIdentity;
use crate::models::{Job, RawEntry, RunRecord, StoredRun};
use crate::traits::{JobCatalog, JobSource, SearchQuery, SourceOutcome};

// ---------------------------------------------------------------------------
// MockSource
// ---------------------------------------------------------------------------

/// One scripted answer of a [`MockSource`].
#[derive(Clone)]
pub enum Script {
    Entries(Vec<RawEntry>),
    Skip(String),
    /// `AppError` is not `Clone`, so failures are built on demand.
    Fail(fn() -> AppError),
    /// Never answers; exercises the aggregator's per-call deadline.
    Hang,
}

/// Mock source that plays back a script.
///
/// Each call pops the first queued script; once the queue is empty the
/// fallback script repeats forever.
#[derive(Clone)]
pub struct MockSource {
    name: String,
    scripts: Arc<Mutex<Vec<Script>>>,
    fallback: Script,
    queries: Arc<Mutex<Vec<SearchQuery>>>,
}

impl MockSource {
    fn build(name: &str, scripts: Vec<Script>, fallback: Script) -> Self {
        Self {
            name: name.to_string(),
            scripts: Arc::new(Mutex::new(scripts)),
            fallback,
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Answers every query with the same entries.
    pub fn returning(name: &str, entries: Vec<RawEntry>) -> Self {
        Self::build(name, Vec::new(), Script::Entries(entries))
    }

    pub fn failing(name: &str, error: fn() -> AppError) -> Self {
        Self::build(name, Vec::new(), Script::Fail(error))
    }

    pub fn skipping(name: &str, reason: &str) -> Self {
        Self::build(name, Vec::new(), Script::Skip(reason.to_string()))
    }

    pub fn hanging(name: &str) -> Self {
        Self::build(name, Vec::new(), Script::Hang)
    }

    /// Plays `scripts` in order, then answers with no entries.
    pub fn with_script(name: &str, scripts: Vec<Script>) -> Self {
        Self::build(name, scripts, Script::Entries(Vec::new()))
    }

    /// Queries received so far, in call order.
    pub fn queries(&self) -> Vec<SearchQuery> {
        self.queries.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    fn next_script(&self) -> Script {
        let mut scripts = self.scripts.lock().unwrap();
        if scripts.is_empty() {
            self.fallback.clone()
        } else {
            scripts.remove(0)
        }
    }
}

#[async_trait]
impl JobSource for MockSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, query: &SearchQuery) -> SourceOutcome {
        self.queries.lock().unwrap().push(query.clone());
        match self.next_script() {
            Script::Entries(entries) => SourceOutcome::Entries(entries),
            Script::Skip(reason) => SourceOutcome::skipped(reason),
            Script::Fail(error) => SourceOutcome::failed(&self.name, error()),
            Script::Hang => {
                std::future::pending::<()>().await;
                SourceOutcome::Entries(Vec::new())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// FailingCatalog
// ---------------------------------------------------------------------------

/// Memory catalog with switchable store failures.
#[derive(Clone, Default)]
pub struct FailingCatalog {
    inner: MemoryCatalog,
    fail_load: bool,
    fail_admit: bool,
    fail_record_run: bool,
}

impl FailingCatalog {
    pub fn failing_load() -> Self {
        Self {
            fail_load: true,
            ..Self::default()
        }
    }

    pub fn failing_admit() -> Self {
        Self {
            fail_admit: true,
            ..Self::default()
        }
    }

    pub fn failing_record_run() -> Self {
        Self {
            fail_record_run: true,
            ..Self::default()
        }
    }

    /// The backing catalog, for assertions on what did get written.
    pub fn inner(&self) -> &MemoryCatalog {
        &self.inner
    }

    fn store_error(op: &str) -> AppError {
        AppError::DatabaseError(format!("{op}: connection refused"))
    }
}

impl JobCatalog for FailingCatalog {
    async fn load_identities(&self) -> Result<Vec<JobIdentity>, AppError> {
        if self.fail_load {
            return Err(Self::store_error("load_identities"));
        }
        self.inner.load_identities().await
    }

    async fn contains(&self, identity: &JobIdentity) -> Result<bool, AppError> {
        self.inner.contains(identity).await
    }

    async fn admit(&self, job: &Job, identity: &JobIdentity) -> Result<bool, AppError> {
        if self.fail_admit {
            return Err(Self::store_error("admit"));
        }
        self.inner.admit(job, identity).await
    }

    async fn record_run(&self, record: &RunRecord) -> Result<Uuid, AppError> {
        if self.fail_record_run {
            return Err(Self::store_error("record_run"));
        }
        self.inner.record_run(record).await
    }

    async fn recent_runs(&self, limit: usize) -> Result<Vec<StoredRun>, AppError> {
        self.inner.recent_runs(limit).await
    }

    async fn job_count(&self) -> Result<u64, AppError> {
        self.inner.job_count().await
    }
}
