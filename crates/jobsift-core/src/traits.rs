use std::future::Future;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AdapterError, AppError};
use crate::identity::JobIdentity;
use crate::models::{Job, RawEntry, RunRecord, StoredRun};

/// Parameters of one search against a source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub term: String,
    pub location: String,
    pub radius_km: u32,
}

impl SearchQuery {
    pub fn new(term: impl Into<String>, location: impl Into<String>, radius_km: u32) -> Self {
        Self {
            term: term.into(),
            location: location.into(),
            radius_km,
        }
    }

    /// Radius converted to whole miles, for providers that take miles.
    pub fn radius_miles(&self) -> u32 {
        (f64::from(self.radius_km) / 1.609_344).round() as u32
    }
}

/// Result of asking one source for listings.
#[derive(Debug)]
pub enum SourceOutcome {
    /// The source answered; the list may be empty.
    Entries(Vec<RawEntry>),
    /// The source was not called, e.g. because its credentials are absent.
    Skipped { reason: String },
    /// Transport, timeout, HTTP status, or parse failure.
    Failed(AdapterError),
}

impl SourceOutcome {
    pub fn skipped(reason: impl Into<String>) -> Self {
        SourceOutcome::Skipped {
            reason: reason.into(),
        }
    }

    pub fn failed(source_name: &str, cause: AppError) -> Self {
        SourceOutcome::Failed(AdapterError::new(source_name, cause))
    }

    /// Fold a fallible fetch into an outcome.
    pub fn from_result(source_name: &str, result: Result<Vec<RawEntry>, AppError>) -> Self {
        match result {
            Ok(entries) => SourceOutcome::Entries(entries),
            Err(cause) => SourceOutcome::failed(source_name, cause),
        }
    }
}

/// A job-listing provider.
///
/// Implementations own authentication, pagination and pacing, and must
/// fold every failure into [`SourceOutcome::Failed`] instead of panicking.
/// Object safe so the aggregator can hold a heterogeneous list of sources.
#[async_trait]
pub trait JobSource: Send + Sync {
    /// Stable, human-readable name. Part of every job identity from this source.
    fn name(&self) -> &str;

    async fn fetch(&self, query: &SearchQuery) -> SourceOutcome;
}

/// Durable catalog of admitted jobs plus the run history.
///
/// `admit` must be insert-if-absent and atomic: either the job row (keyed by
/// its identity) exists afterwards or nothing was written.
pub trait JobCatalog: Send + Sync + Clone {
    /// Every identity admitted so far, for seeding the in-memory index.
    fn load_identities(&self) -> impl Future<Output = Result<Vec<JobIdentity>, AppError>> + Send;

    fn contains(
        &self,
        identity: &JobIdentity,
    ) -> impl Future<Output = Result<bool, AppError>> + Send;

    /// Insert the job if its identity is new. Returns `true` if a row was written.
    fn admit(
        &self,
        job: &Job,
        identity: &JobIdentity,
    ) -> impl Future<Output = Result<bool, AppError>> + Send;

    /// Append a finalized run to the history. Returns the generated id.
    fn record_run(&self, record: &RunRecord) -> impl Future<Output = Result<Uuid, AppError>> + Send;

    /// Most recent runs, newest first.
    fn recent_runs(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<StoredRun>, AppError>> + Send;

    fn job_count(&self) -> impl Future<Output = Result<u64, AppError>> + Send;
}
