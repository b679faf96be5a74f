use std::collections::HashSet;

use tokio::sync::Mutex;

use crate::error::AppError;
use crate::identity::JobIdentity;
use crate::models::Job;
use crate::traits::JobCatalog;

/// Result of offering a job to the deduplicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// First sighting: the job is now in the catalog.
    Admitted,
    /// Identity already known, from an earlier run or earlier in this one.
    Duplicate,
}

/// Identity index in front of a [`JobCatalog`].
///
/// The index is seeded from the catalog once, then kept in step with every
/// successful admission so duplicate checks never hit the database.
pub struct Deduplicator<C: JobCatalog> {
    catalog: C,
    seen: Mutex<HashSet<JobIdentity>>,
}

impl<C: JobCatalog> Deduplicator<C> {
    /// Load every known identity from the catalog.
    pub async fn load(catalog: C) -> Result<Self, AppError> {
        let identities = catalog.load_identities().await?;
        tracing::debug!(known = identities.len(), "Loaded identity index");
        Ok(Self {
            catalog,
            seen: Mutex::new(identities.into_iter().collect()),
        })
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub async fn is_duplicate(&self, identity: &JobIdentity) -> bool {
        self.seen.lock().await.contains(identity)
    }

    pub async fn known(&self) -> usize {
        self.seen.lock().await.len()
    }

    /// Check and admit in one critical section.
    ///
    /// The index is only updated after the catalog write succeeds, so a failed
    /// write never leaves an identity marked seen without its job persisted.
    pub async fn admit(&self, job: &Job, identity: &JobIdentity) -> Result<Admission, AppError> {
        let mut seen = self.seen.lock().await;
        if seen.contains(identity) {
            return Ok(Admission::Duplicate);
        }

        let inserted = self.catalog.admit(job, identity).await?;
        seen.insert(identity.clone());

        if inserted {
            tracing::debug!(identity = %identity.short(), title = %job.title, "Admitted job");
            Ok(Admission::Admitted)
        } else {
            // Present in the catalog but missing from the index, e.g. written
            // by another process since the index was loaded.
            Ok(Admission::Duplicate)
        }
    }
}
