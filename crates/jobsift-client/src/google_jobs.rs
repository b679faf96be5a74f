use async_trait::async_trait;
use jobsift_core::error::AppError;
use jobsift_core::models::{RawEntry, Salary};
use jobsift_core::traits::{JobSource, SearchQuery, SourceOutcome};
use serde::Deserialize;
use url::Url;

use crate::config::SourceCredentials;
use crate::http::{ApiClient, endpoint};

pub const NAME: &str = "Google Jobs";

const BASE_URL: &str = "https://serpapi.com/search";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    jobs_results: Vec<Listing>,
}

#[derive(Debug, Deserialize)]
struct Listing {
    title: Option<String>,
    company_name: Option<String>,
    location: Option<String>,
    description: Option<String>,
    #[serde(default)]
    detected_extensions: Extensions,
    share_link: Option<String>,
    #[serde(default)]
    related_links: Vec<Link>,
}

#[derive(Debug, Default, Deserialize)]
struct Extensions {
    salary: Option<String>,
    posted_at: Option<String>,
    schedule_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Link {
    link: Option<String>,
}

impl From<Listing> for RawEntry {
    fn from(l: Listing) -> Self {
        let url = l
            .share_link
            .or_else(|| l.related_links.into_iter().find_map(|r| r.link));
        RawEntry {
            title: l.title,
            company: l.company_name,
            location: l.location,
            salary: Salary::from_text(l.detected_extensions.salary.as_deref()),
            job_type: l.detected_extensions.schedule_type,
            url,
            posted: l.detected_extensions.posted_at,
            description: l.description,
        }
    }
}

/// Google Jobs through SerpApi. Needs a SerpApi key.
#[derive(Clone)]
pub struct GoogleJobsSource {
    client: ApiClient,
    api_key: Option<String>,
}

impl GoogleJobsSource {
    pub fn new(client: ApiClient, credentials: &SourceCredentials) -> Self {
        Self {
            client,
            api_key: credentials.serp_api_key.clone(),
        }
    }

    fn search_url(api_key: &str, query: &SearchQuery) -> Result<Url, AppError> {
        endpoint(
            BASE_URL,
            [
                ("engine", "google_jobs"),
                ("q", query.term.as_str()),
                ("location", query.location.as_str()),
                ("hl", "en"),
                ("chips", "date_posted:today"),
                ("api_key", api_key),
            ],
        )
    }

    async fn search(&self, api_key: &str, query: &SearchQuery) -> Result<Vec<RawEntry>, AppError> {
        let url = Self::search_url(api_key, query)?;
        let response: SearchResponse = self.client.get_json(url, &[]).await?;
        Ok(response.jobs_results.into_iter().map(RawEntry::from).collect())
    }
}

#[async_trait]
impl JobSource for GoogleJobsSource {
    fn name(&self) -> &str {
        NAME
    }

    async fn fetch(&self, query: &SearchQuery) -> SourceOutcome {
        let Some(api_key) = &self.api_key else {
            return SourceOutcome::skipped("SERP_API_KEY not set");
        };
        SourceOutcome::from_result(NAME, self.search(api_key, query).await)
    }
}
