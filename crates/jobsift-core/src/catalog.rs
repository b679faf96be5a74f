//! In-process [`JobCatalog`] implementation.
//!
//! Backs dry runs (nothing survives the process) and the aggregation tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use uuid::Uuid;

use crate::error::AppError;
use crate::identity::JobIdentity;
use crate::models::{Job, RunRecord, StoredRun};
use crate::traits::JobCatalog;

#[derive(Debug, Default)]
struct Inner {
    jobs: HashMap<JobIdentity, Job>,
    runs: Vec<(Uuid, RunRecord)>,
}

/// Catalog held entirely in memory. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog pre-populated with jobs, as if admitted by earlier runs.
    pub fn seeded(jobs: impl IntoIterator<Item = Job>) -> Self {
        let catalog = Self::new();
        {
            let mut inner = catalog.lock();
            for job in jobs {
                inner.jobs.insert(JobIdentity::of(&job), job);
            }
        }
        catalog
    }

    pub fn jobs(&self) -> Vec<Job> {
        self.lock().jobs.values().cloned().collect()
    }

    pub fn runs(&self) -> Vec<RunRecord> {
        self.lock().runs.iter().map(|(_, r)| r.clone()).collect()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl JobCatalog for MemoryCatalog {
    async fn load_identities(&self) -> Result<Vec<JobIdentity>, AppError> {
        Ok(self.lock().jobs.keys().cloned().collect())
    }

    async fn contains(&self, identity: &JobIdentity) -> Result<bool, AppError> {
        Ok(self.lock().jobs.contains_key(identity))
    }

    async fn admit(&self, job: &Job, identity: &JobIdentity) -> Result<bool, AppError> {
        let mut inner = self.lock();
        if inner.jobs.contains_key(identity) {
            return Ok(false);
        }
        inner.jobs.insert(identity.clone(), job.clone());
        Ok(true)
    }

    async fn record_run(&self, record: &RunRecord) -> Result<Uuid, AppError> {
        let id = Uuid::new_v4();
        self.lock().runs.push((id, record.clone()));
        Ok(id)
    }

    async fn recent_runs(&self, limit: usize) -> Result<Vec<StoredRun>, AppError> {
        let inner = self.lock();
        Ok(inner
            .runs
            .iter()
            .rev()
            .take(limit)
            .map(|(id, r)| StoredRun {
                id: *id,
                run_at: r.run_at,
                jobs_found: r.jobs_found as i64,
                new_jobs: r.new_jobs as i64,
                queries_processed: r.queries_processed as i64,
                sources: r.sources.iter().cloned().collect(),
            })
            .collect())
    }

    async fn job_count(&self) -> Result<u64, AppError> {
        Ok(self.lock().jobs.len() as u64)
    }
}
