use async_trait::async_trait;
use jobsift_core::error::AppError;
use jobsift_core::models::{RawEntry, Salary};
use jobsift_core::traits::{JobSource, SearchQuery, SourceOutcome};
use serde::Deserialize;
use url::Url;

use crate::cleaner::DescriptionCleaner;
use crate::config::ClientSettings;
use crate::http::{ApiClient, Snapshot};

pub const NAME: &str = "Remotive";

const FEED_URL: &str = "https://remotive.com/api/remote-jobs";
/// Only the newest listings of the feed are considered.
const FEED_CAP: usize = 50;

#[derive(Debug, Deserialize)]
struct Feed {
    #[serde(default)]
    jobs: Vec<Listing>,
}

#[derive(Debug, Clone, Deserialize)]
struct Listing {
    title: Option<String>,
    company_name: Option<String>,
    salary: Option<String>,
    job_type: Option<String>,
    url: Option<String>,
    publication_date: Option<String>,
    description: Option<String>,
}

impl Listing {
    fn matches(&self, term: &str) -> bool {
        self.title
            .as_deref()
            .is_some_and(|title| title.to_lowercase().contains(term))
    }

    fn to_entry(&self, cleaner: &DescriptionCleaner) -> RawEntry {
        RawEntry {
            title: self.title.clone(),
            company: self.company_name.clone(),
            location: Some("Remote".to_string()),
            salary: Salary::from_text(self.salary.as_deref()),
            job_type: self.job_type.as_ref().map(|t| t.replace('_', " ")),
            url: self.url.clone(),
            posted: self.publication_date.clone(),
            description: self.description.as_deref().map(|d| cleaner.clean(d)),
        }
    }
}

/// Remotive remote-jobs feed. No key; the feed has no keyword search, so the
/// query term is matched against titles client side.
#[derive(Clone)]
pub struct RemotiveSource {
    client: ApiClient,
    cleaner: DescriptionCleaner,
    feed: Snapshot<Listing>,
}

impl RemotiveSource {
    pub fn new(client: ApiClient, settings: &ClientSettings) -> Self {
        Self {
            client,
            cleaner: DescriptionCleaner::new(),
            feed: Snapshot::new(settings.snapshot_ttl),
        }
    }

    async fn download(&self) -> Result<Vec<Listing>, AppError> {
        let url = Url::parse(FEED_URL)
            .map_err(|e| AppError::ConfigError(format!("Invalid endpoint {FEED_URL}: {e}")))?;
        let feed: Feed = self.client.get_json(url, &[]).await?;
        Ok(feed.jobs.into_iter().take(FEED_CAP).collect())
    }

    fn select(&self, listings: &[Listing], term: &str) -> Vec<RawEntry> {
        let term = term.trim().to_lowercase();
        listings
            .iter()
            .filter(|l| l.matches(&term))
            .map(|l| l.to_entry(&self.cleaner))
            .collect()
    }
}

#[async_trait]
impl JobSource for RemotiveSource {
    fn name(&self) -> &str {
        NAME
    }

    async fn fetch(&self, query: &SearchQuery) -> SourceOutcome {
        let listings = self.feed.get_or_load(|| self.download()).await;
        SourceOutcome::from_result(NAME, listings.map(|l| self.select(&l, &query.term)))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn source() -> RemotiveSource {
        RemotiveSource::new(ApiClient::new().unwrap(), &ClientSettings::default())
    }

    fn feed(value: serde_json::Value) -> Vec<Listing> {
        serde_json::from_value::<Feed>(value).unwrap().jobs
    }

    #[test]
    fn matches_titles_case_insensitively() {
        let listings = feed(json!({"jobs": [
            {"title": "Senior Technical Product Manager", "company_name": "Doist"},
            {"title": "Backend Engineer", "company_name": "Doist"},
            {"company_name": "Untitled Co"}
        ]}));

        let entries = source().select(&listings, "Technical Product Manager");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].company.as_deref(), Some("Doist"));
        assert_eq!(entries[0].location.as_deref(), Some("Remote"));
    }

    #[test]
    fn maps_fields_and_cleans_html_description() {
        let listings = feed(json!({"jobs": [{
            "title": "Growth Product Manager",
            "company_name": "Hotjar",
            "salary": "$110k - $130k",
            "job_type": "full_time",
            "url": "https://remotive.com/remote-jobs/product/1",
            "publication_date": "2026-03-01T14:03:11",
            "description": "<p>Run <strong>experiments</strong></p>"
        }]}));

        let e = &source().select(&listings, "growth")[0];
        assert_eq!(e.salary, Salary::from_text(Some("$110k - $130k")));
        assert_eq!(e.job_type.as_deref(), Some("full time"));
        let description = e.description.as_deref().unwrap();
        assert!(description.contains("experiments"));
        assert!(!description.contains("<p>"));
    }

    #[test]
    fn empty_feed_yields_nothing() {
        assert!(source().select(&feed(json!({})), "pm").is_empty());
    }
}
