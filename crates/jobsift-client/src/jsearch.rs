use async_trait::async_trait;
use jobsift_core::error::AppError;
use jobsift_core::models::{RawEntry, Salary};
use jobsift_core::traits::{JobSource, SearchQuery, SourceOutcome};
use serde::Deserialize;
use url::Url;

use crate::config::SourceCredentials;
use crate::http::{ApiClient, endpoint};

/// JSearch aggregates Indeed, LinkedIn, Glassdoor and ZipRecruiter.
pub const NAME: &str = "Indeed/LinkedIn/Glassdoor (JSearch)";

const BASE_URL: &str = "https://jsearch.p.rapidapi.com/search";
const RAPIDAPI_HOST: &str = "jsearch.p.rapidapi.com";
/// Pages requested per call; JSearch paginates server side.
const NUM_PAGES: u32 = 3;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<Listing>,
}

#[derive(Debug, Deserialize)]
struct Listing {
    job_title: Option<String>,
    employer_name: Option<String>,
    job_city: Option<String>,
    job_state: Option<String>,
    job_min_salary: Option<f64>,
    job_max_salary: Option<f64>,
    job_salary: Option<String>,
    job_employment_type: Option<String>,
    job_apply_link: Option<String>,
    job_posted_at_datetime_utc: Option<String>,
    job_description: Option<String>,
}

impl From<Listing> for RawEntry {
    fn from(l: Listing) -> Self {
        let location = [l.job_city, l.job_state]
            .into_iter()
            .flatten()
            .filter(|part| !part.trim().is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        let salary = match Salary::from_range(l.job_min_salary, l.job_max_salary) {
            Salary::NotSpecified => Salary::from_text(l.job_salary.as_deref()),
            range => range,
        };

        RawEntry {
            title: l.job_title,
            company: l.employer_name,
            location: Some(location).filter(|s| !s.is_empty()),
            salary,
            job_type: l.job_employment_type,
            url: l.job_apply_link,
            posted: l.job_posted_at_datetime_utc,
            description: l.job_description,
        }
    }
}

/// JSearch on RapidAPI. Needs an API key.
#[derive(Clone)]
pub struct JSearchSource {
    client: ApiClient,
    api_key: Option<String>,
}

impl JSearchSource {
    pub fn new(client: ApiClient, credentials: &SourceCredentials) -> Self {
        Self {
            client,
            api_key: credentials.jsearch_api_key.clone(),
        }
    }

    fn search_url(query: &SearchQuery) -> Result<Url, AppError> {
        endpoint(
            BASE_URL,
            [
                ("query", format!("{} in {}", query.term, query.location)),
                ("page", "1".to_string()),
                ("num_pages", NUM_PAGES.to_string()),
                ("date_posted", "today".to_string()),
                ("radius", query.radius_km.to_string()),
            ],
        )
    }

    async fn search(&self, api_key: &str, query: &SearchQuery) -> Result<Vec<RawEntry>, AppError> {
        let url = Self::search_url(query)?;
        let response: SearchResponse = self
            .client
            .get_json(
                url,
                &[("X-RapidAPI-Key", api_key), ("X-RapidAPI-Host", RAPIDAPI_HOST)],
            )
            .await?;
        Ok(response.data.into_iter().map(RawEntry::from).collect())
    }
}

#[async_trait]
impl JobSource for JSearchSource {
    fn name(&self) -> &str {
        NAME
    }

    async fn fetch(&self, query: &SearchQuery) -> SourceOutcome {
        let Some(api_key) = &self.api_key else {
            return SourceOutcome::skipped("JSEARCH_API_KEY not set");
        };
        SourceOutcome::from_result(NAME, self.search(api_key, query).await)
    }
}
