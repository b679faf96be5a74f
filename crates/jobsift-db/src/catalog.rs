use jobsift_core::error::AppError;
use jobsift_core::identity::JobIdentity;
use jobsift_core::models::{Job, RunRecord, StoredRun};
use jobsift_core::traits::JobCatalog;
use uuid::Uuid;

use crate::job_repository::JobRepository;
use crate::run_repository::RunRepository;

/// PostgreSQL-backed [`JobCatalog`]: the jobs table plus the run history.
#[derive(Clone)]
pub struct PgCatalog {
    jobs: JobRepository,
    runs: RunRepository,
}

impl PgCatalog {
    pub fn new(jobs: JobRepository, runs: RunRepository) -> Self {
        Self { jobs, runs }
    }

    pub fn jobs(&self) -> &JobRepository {
        &self.jobs
    }

    pub fn runs(&self) -> &RunRepository {
        &self.runs
    }
}

impl JobCatalog for PgCatalog {
    async fn load_identities(&self) -> Result<Vec<JobIdentity>, AppError> {
        self.jobs.identities().await
    }

    async fn contains(&self, identity: &JobIdentity) -> Result<bool, AppError> {
        self.jobs.exists(identity).await
    }

    async fn admit(&self, job: &Job, identity: &JobIdentity) -> Result<bool, AppError> {
        self.jobs.insert_if_absent(job, identity).await
    }

    async fn record_run(&self, record: &RunRecord) -> Result<Uuid, AppError> {
        self.runs.save(record).await
    }

    async fn recent_runs(&self, limit: usize) -> Result<Vec<StoredRun>, AppError> {
        self.runs.recent(limit).await
    }

    async fn job_count(&self) -> Result<u64, AppError> {
        self.jobs.count().await
    }
}
