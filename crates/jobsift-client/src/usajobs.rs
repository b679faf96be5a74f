use async_trait::async_trait;
use jobsift_core::error::AppError;
use jobsift_core::models::{RawEntry, Salary};
use jobsift_core::traits::{JobSource, SearchQuery, SourceOutcome};
use serde::Deserialize;
use url::Url;

use crate::config::{ClientSettings, SourceCredentials};
use crate::http::{ApiClient, Pacer, endpoint};

pub const NAME: &str = "USAJobs.gov";

const BASE_URL: &str = "https://data.usajobs.gov/api/search";
const RESULTS_PER_PAGE: usize = 50;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SearchResponse {
    #[serde(default)]
    search_result: SearchResult,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SearchResult {
    #[serde(default)]
    search_result_items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Item {
    matched_object_descriptor: Descriptor,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Descriptor {
    position_title: Option<String>,
    organization_name: Option<String>,
    position_location_display: Option<String>,
    #[serde(default)]
    position_remuneration: Vec<Remuneration>,
    #[serde(default)]
    position_schedule: Vec<Coded>,
    #[serde(rename = "ApplyURI", default)]
    apply_uri: Vec<String>,
    #[serde(rename = "PositionURI")]
    position_uri: Option<String>,
    publication_start_date: Option<String>,
    qualification_summary: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Remuneration {
    minimum_range: Option<String>,
    maximum_range: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Coded {
    name: Option<String>,
}

impl Remuneration {
    fn salary(&self) -> Salary {
        let parse = |v: &Option<String>| v.as_deref().and_then(|s| s.trim().parse::<f64>().ok());
        match Salary::from_range(parse(&self.minimum_range), parse(&self.maximum_range)) {
            Salary::NotSpecified => Salary::from_text(self.description.as_deref()),
            range => range,
        }
    }
}

impl From<Descriptor> for RawEntry {
    fn from(d: Descriptor) -> Self {
        RawEntry {
            title: d.position_title,
            company: d.organization_name,
            location: d.position_location_display,
            salary: d
                .position_remuneration
                .first()
                .map(Remuneration::salary)
                .unwrap_or_default(),
            job_type: d.position_schedule.into_iter().find_map(|s| s.name),
            url: d.apply_uri.into_iter().next().or(d.position_uri),
            posted: d.publication_start_date,
            description: d.qualification_summary,
        }
    }
}

/// USAJobs.gov federal listings. Needs a registered email and API key.
#[derive(Clone)]
pub struct UsaJobsSource {
    client: ApiClient,
    credentials: Option<(String, String)>,
    pacer: Pacer,
    max_pages: u32,
}

impl UsaJobsSource {
    pub fn new(client: ApiClient, credentials: &SourceCredentials, settings: &ClientSettings) -> Self {
        let credentials = credentials
            .usajobs_email
            .clone()
            .zip(credentials.usajobs_api_key.clone());
        Self {
            client,
            credentials,
            pacer: Pacer::new(settings.page_delay),
            max_pages: settings.max_pages.max(1),
        }
    }

    /// USAJobs takes its radius in miles.
    fn page_url(query: &SearchQuery, page: u32) -> Result<Url, AppError> {
        endpoint(
            BASE_URL,
            [
                ("Keyword", query.term.clone()),
                ("LocationName", query.location.clone()),
                ("Radius", query.radius_miles().to_string()),
                ("ResultsPerPage", RESULTS_PER_PAGE.to_string()),
                ("Page", page.to_string()),
            ],
        )
    }

    async fn page(&self, email: &str, api_key: &str, query: &SearchQuery, page: u32) -> Result<Vec<RawEntry>, AppError> {
        let url = Self::page_url(query, page)?;
        let response: SearchResponse = self
            .client
            .get_json(url, &[("User-Agent", email), ("Authorization-Key", api_key)])
            .await?;
        Ok(response
            .search_result
            .search_result_items
            .into_iter()
            .map(|item| RawEntry::from(item.matched_object_descriptor))
            .collect())
    }
}

#[async_trait]
impl JobSource for UsaJobsSource {
    fn name(&self) -> &str {
        NAME
    }

    async fn fetch(&self, query: &SearchQuery) -> SourceOutcome {
        let Some((email, api_key)) = &self.credentials else {
            return SourceOutcome::skipped("USAJOBS_EMAIL / USAJOBS_API_KEY not set");
        };

        let mut entries = Vec::new();
        for page in 1..=self.max_pages {
            self.pacer.wait().await;
            match self.page(email, api_key, query, page).await {
                Ok(batch) => {
                    let count = batch.len();
                    entries.extend(batch);
                    if count < RESULTS_PER_PAGE {
                        break;
                    }
                }
                Err(e) if page == 1 => return SourceOutcome::failed(NAME, e),
                Err(e) => {
                    tracing::warn!(source = NAME, page, error = %e, "Page failed, keeping earlier pages");
                    break;
                }
            }
        }
        SourceOutcome::Entries(entries)
    }
}
