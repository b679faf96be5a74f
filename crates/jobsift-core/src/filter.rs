use serde::{Deserialize, Serialize};

use crate::models::Job;

/// Include/exclude keyword rule applied to admitted jobs before reporting.
///
/// A job passes when its case-folded `title + description` contains at least
/// one include keyword and none of the exclude keywords. Matching is plain
/// substring search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordFilter {
    include: Vec<String>,
    exclude: Vec<String>,
}

impl KeywordFilter {
    pub fn new<I, E, S, T>(include: I, exclude: E) -> Self
    where
        I: IntoIterator<Item = S>,
        E: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        Self {
            include: fold_all(include),
            exclude: fold_all(exclude),
        }
    }

    pub fn matches(&self, job: &Job) -> bool {
        let text = format!("{} {}", job.title, job.description).to_lowercase();
        let included = self.include.iter().any(|kw| text.contains(kw.as_str()));
        included && !self.exclude.iter().any(|kw| text.contains(kw.as_str()))
    }

    /// Jobs that pass, in input order.
    pub fn apply(&self, jobs: &[Job]) -> Vec<Job> {
        jobs.iter().filter(|job| self.matches(job)).cloned().collect()
    }
}

fn fold_all<S: AsRef<str>>(keywords: impl IntoIterator<Item = S>) -> Vec<String> {
    keywords
        .into_iter()
        .map(|kw| kw.as_ref().trim().to_lowercase())
        .filter(|kw| !kw.is_empty())
        .collect()
}
