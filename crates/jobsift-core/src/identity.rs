use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::{Job, compute_hash};

/// Separator placed between identity components so that
/// `("ab", "c")` and `("a", "bc")` never collide.
const FIELD_SEPARATOR: char = '\u{1f}';

/// Stable fingerprint of a listing: SHA-256 over the lower-cased
/// `(title, company, source)` triple.
///
/// Everything else on a [`Job`] (location, salary, URL, ...) may drift
/// between refreshes of the same posting and is deliberately left out.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobIdentity(String);

impl JobIdentity {
    /// Compute the identity of a job.
    pub fn of(job: &Job) -> Self {
        Self::from_parts(&job.title, &job.company, &job.source)
    }

    pub fn from_parts(title: &str, company: &str, source: &str) -> Self {
        let mut key = String::with_capacity(title.len() + company.len() + source.len() + 2);
        key.push_str(&title.to_lowercase());
        key.push(FIELD_SEPARATOR);
        key.push_str(&company.to_lowercase());
        key.push(FIELD_SEPARATOR);
        key.push_str(&source.to_lowercase());
        Self(compute_hash(&key))
    }

    /// Wrap an identity previously persisted as hex (e.g. a catalog primary key).
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 8 hex characters, for log lines.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(8)]
    }
}

impl fmt::Display for JobIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
