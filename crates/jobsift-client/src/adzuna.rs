use async_trait::async_trait;
use jobsift_core::error::AppError;
use jobsift_core::models::{RawEntry, Salary};
use jobsift_core::traits::{JobSource, SearchQuery, SourceOutcome};
use serde::Deserialize;
use url::Url;

use crate::config::{ClientSettings, SourceCredentials};
use crate::http::{ApiClient, Pacer, endpoint};

pub const NAME: &str = "Adzuna";

const BASE_URL: &str = "https://api.adzuna.com/v1/api/jobs/us/search";
const RESULTS_PER_PAGE: u32 = 50;
const MAX_DAYS_OLD: u32 = 1;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Listing>,
}

#[derive(Debug, Deserialize)]
struct Listing {
    title: Option<String>,
    company: Option<Named>,
    location: Option<Named>,
    salary_min: Option<f64>,
    salary_max: Option<f64>,
    contract_time: Option<String>,
    redirect_url: Option<String>,
    created: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Named {
    display_name: Option<String>,
}

impl From<Listing> for RawEntry {
    fn from(l: Listing) -> Self {
        RawEntry {
            title: l.title,
            company: l.company.and_then(|c| c.display_name),
            location: l.location.and_then(|c| c.display_name),
            salary: Salary::from_range(l.salary_min, l.salary_max),
            job_type: l.contract_time.map(|t| t.replace('_', " ")),
            url: l.redirect_url,
            posted: l.created,
            description: l.description,
        }
    }
}

/// Adzuna job search. Paginated; needs an app id and key.
#[derive(Clone)]
pub struct AdzunaSource {
    client: ApiClient,
    credentials: Option<(String, String)>,
    pacer: Pacer,
    max_pages: u32,
}

impl AdzunaSource {
    pub fn new(client: ApiClient, credentials: &SourceCredentials, settings: &ClientSettings) -> Self {
        let credentials = credentials
            .adzuna_app_id
            .clone()
            .zip(credentials.adzuna_app_key.clone());
        Self {
            client,
            credentials,
            pacer: Pacer::new(settings.page_delay),
            max_pages: settings.max_pages.max(1),
        }
    }

    fn page_url(&self, app_id: &str, app_key: &str, query: &SearchQuery, page: u32) -> Result<Url, AppError> {
        endpoint(
            &format!("{BASE_URL}/{page}"),
            [
                ("app_id", app_id.to_string()),
                ("app_key", app_key.to_string()),
                ("what", query.term.clone()),
                ("where", query.location.clone()),
                ("distance", query.radius_km.to_string()),
                ("max_days_old", MAX_DAYS_OLD.to_string()),
                ("results_per_page", RESULTS_PER_PAGE.to_string()),
                ("sort_by", "date".to_string()),
            ],
        )
    }
}

#[async_trait]
impl JobSource for AdzunaSource {
    fn name(&self) -> &str {
        NAME
    }

    async fn fetch(&self, query: &SearchQuery) -> SourceOutcome {
        let Some((app_id, app_key)) = &self.credentials else {
            return SourceOutcome::skipped("ADZUNA_APP_ID / ADZUNA_APP_KEY not set");
        };

        let mut entries = Vec::new();
        for page in 1..=self.max_pages {
            self.pacer.wait().await;
            let result = match self.page_url(app_id, app_key, query, page) {
                Ok(url) => self.client.get_json::<SearchResponse>(url, &[]).await,
                Err(e) => Err(e),
            };

            match result {
                Ok(response) if response.results.is_empty() => break,
                Ok(response) => {
                    let count = response.results.len();
                    entries.extend(response.results.into_iter().map(RawEntry::from));
                    tracing::debug!(source = NAME, page, count, "Fetched page");
                    if count < RESULTS_PER_PAGE as usize {
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
