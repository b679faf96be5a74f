use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Sentinel stored in place of a missing optional text field.
pub const NOT_SPECIFIED: &str = "Not specified";

/// Compensation as reported by a provider.
///
/// Providers either report a numeric range, a free-text blurb
/// (e.g. `"$50 an hour"`), or nothing at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Salary {
    Range {
        min: Option<f64>,
        max: Option<f64>,
    },
    Text {
        value: String,
    },
    #[default]
    NotSpecified,
}

impl Salary {
    /// Build a salary from an optional min/max pair. Both missing (or zero)
    /// collapses to [`Salary::NotSpecified`].
    pub fn from_range(min: Option<f64>, max: Option<f64>) -> Self {
        let min = min.filter(|v| *v > 0.0);
        let max = max.filter(|v| *v > 0.0);
        if min.is_none() && max.is_none() {
            Salary::NotSpecified
        } else {
            Salary::Range { min, max }
        }
    }

    /// Build a salary from optional free text. Blank text is `NotSpecified`.
    pub fn from_text(text: Option<&str>) -> Self {
        match text.map(str::trim) {
            Some(t) if !t.is_empty() => Salary::Text {
                value: t.to_string(),
            },
            _ => Salary::NotSpecified,
        }
    }

    pub fn is_specified(&self) -> bool {
        !matches!(self, Salary::NotSpecified)
    }
}

impl fmt::Display for Salary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Salary::Range {
                min: Some(min),
                max: Some(max),
            } => write!(f, "${} - ${}", group_thousands(*min), group_thousands(*max)),
            Salary::Range {
                min: Some(min),
                max: None,
            } => write!(f, "from ${}", group_thousands(*min)),
            Salary::Range {
                min: None,
                max: Some(max),
            } => write!(f, "up to ${}", group_thousands(*max)),
            Salary::Range {
                min: None,
                max: None,
            }
            | Salary::NotSpecified => f.write_str(NOT_SPECIFIED),
            Salary::Text { value } => f.write_str(value),
        }
    }
}

/// Format a non-negative amount as whole units with `,` thousands separators.
fn group_thousands(amount: f64) -> String {
    let digits = format!("{:.0}", amount.max(0.0));
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// A provider-native listing, already lifted out of the provider's JSON shape
/// by its adapter but not yet cleaned up.
///
/// Every field is optional because providers disagree on what they send.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEntry {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub salary: Salary,
    pub job_type: Option<String>,
    pub url: Option<String>,
    pub posted: Option<String>,
    pub description: Option<String>,
}

impl RawEntry {
    pub fn new(title: impl Into<String>, company: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            company: Some(company.into()),
            ..Self::default()
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_salary(mut self, salary: Salary) -> Self {
        self.salary = salary;
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// The canonical job record every source is normalized into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: Salary,
    pub job_type: String,
    pub url: String,
    /// Provider-supplied posting time, kept verbatim (formats vary).
    pub posted: String,
    /// Name of the source adapter that produced this job.
    pub source: String,
    /// Description excerpt, at most [`MAX_DESCRIPTION_CHARS`](crate::normalize::MAX_DESCRIPTION_CHARS) characters.
    pub description: String,
    /// Search term that surfaced this job.
    pub query: String,
}

/// Statistics of one completed aggregation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub run_at: DateTime<Utc>,
    /// Raw entries returned by all sources, before normalization and dedup.
    pub jobs_found: usize,
    /// Jobs admitted to the catalog for the first time.
    pub new_jobs: usize,
    pub queries_processed: usize,
    /// Sources that returned at least one raw entry.
    pub sources: BTreeSet<String>,
}

impl RunRecord {
    /// Source names joined the way the run history table stores them.
    pub fn sources_joined(&self) -> String {
        self.sources
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A persisted [`RunRecord`] as read back from the run history.
#[derive(Debug, Clone, Serialize)]
pub struct StoredRun {
    pub id: uuid::Uuid,
    pub run_at: DateTime<Utc>,
    pub jobs_found: i64,
    pub new_jobs: i64,
    pub queries_processed: i64,
    pub sources: Vec<String>,
}

/// Compute a SHA-256 hash of a string, returned as 64-char hex.
pub fn compute_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_hash_consistency() {
        let h1 = compute_hash("hello world");
        let h2 = compute_hash("hello world");
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
    }

    #[test]
    fn salary_range_formats_with_separators() {
        let salary = Salary::from_range(Some(90000.0), Some(120000.0));
        assert_eq!(salary.to_string(), "$90,000 - $120,000");
    }

    #[test]
    fn salary_open_ended_ranges() {
        assert_eq!(Salary::from_range(Some(750.0), None).to_string(), "from $750");
        assert_eq!(
            Salary::from_range(None, Some(1_250_000.0)).to_string(),
            "up to $1,250,000"
        );
    }

    #[test]
    fn salary_missing_values_collapse_to_not_specified() {
        assert_eq!(Salary::from_range(None, None), Salary::NotSpecified);
        assert_eq!(Salary::from_range(Some(0.0), None), Salary::NotSpecified);
        assert_eq!(Salary::from_text(Some("   ")), Salary::NotSpecified);
        assert_eq!(Salary::NotSpecified.to_string(), NOT_SPECIFIED);
    }

    #[test]
    fn salary_serializes_tagged() {
        let json = serde_json::to_value(Salary::from_text(Some("$50 an hour"))).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "text", "value": "$50 an hour"}));

        let json = serde_json::to_value(Salary::NotSpecified).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "not_specified"}));
    }

    #[test]
    fn run_record_joins_sources_sorted() {
        let record = RunRecord {
            run_at: Utc::now(),
            jobs_found: 3,
            new_jobs: 1,
            queries_processed: 2,
            sources: ["Remotive", "Adzuna"].into_iter().map(String::from).collect(),
        };
        assert_eq!(record.sources_joined(), "Adzuna, Remotive");
    }
}
