use async_trait::async_trait;
use jobsift_core::error::AppError;
use jobsift_core::models::RawEntry;
use jobsift_core::traits::{JobSource, SearchQuery, SourceOutcome};
use serde::Deserialize;
use url::Url;

use crate::cleaner::DescriptionCleaner;
use crate::config::ClientSettings;
use crate::http::{ApiClient, Pacer, Snapshot, endpoint};

pub const NAME: &str = "The Muse";

const BASE_URL: &str = "https://www.themuse.com/api/public/jobs";

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    results: Vec<Listing>,
}

#[derive(Debug, Deserialize)]
struct Listing {
    name: Option<String>,
    company: Option<Named>,
    #[serde(default)]
    locations: Vec<Named>,
    publication_date: Option<String>,
    refs: Option<Refs>,
    contents: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

/// The Muse uses `{"name": ...}` objects for companies and locations alike.
#[derive(Debug, Deserialize)]
struct Named {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Refs {
    landing_page: Option<String>,
}

impl Listing {
    fn into_entry(self, cleaner: &DescriptionCleaner) -> RawEntry {
        let location = self
            .locations
            .into_iter()
            .filter_map(|l| l.name)
            .collect::<Vec<_>>()
            .join(", ");
        RawEntry {
            title: self.name,
            company: self.company.and_then(|c| c.name),
            location: Some(location).filter(|l| !l.is_empty()),
            salary: Default::default(),
            job_type: self.kind,
            url: self.refs.and_then(|r| r.landing_page),
            posted: self.publication_date,
            description: self.contents.as_deref().map(|c| cleaner.clean(c)),
        }
    }
}

/// One filtered listing request against The Muse, e.g. category + level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MuseSearch {
    pub params: Vec<(String, String)>,
}

impl MuseSearch {
    pub fn new<'a>(params: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            params: params
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Product management listings: mid level, senior level, and remote.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new([("category", "Product Management"), ("level", "Mid Level")]),
            Self::new([("category", "Product Management"), ("level", "Senior Level")]),
            Self::new([("category", "Product Management"), ("location", "Remote")]),
        ]
    }

    fn page_url(&self, page: u32) -> Result<Url, AppError> {
        let mut params = self.params.clone();
        params.push(("page".into(), page.to_string()));
        params.push(("descending".into(), "true".into()));
        endpoint(BASE_URL, params)
    }
}

/// The Muse public jobs API. No key and no keyword search: it browses the
/// configured category filters once per snapshot, and each query term is
/// matched against the downloaded titles.
#[derive(Clone)]
pub struct TheMuseSource {
    client: ApiClient,
    cleaner: DescriptionCleaner,
    searches: Vec<MuseSearch>,
    pacer: Pacer,
    max_pages: u32,
    listing: Snapshot<RawEntry>,
}

impl TheMuseSource {
    pub fn new(client: ApiClient, settings: &ClientSettings) -> Self {
        Self {
            client,
            cleaner: DescriptionCleaner::new(),
            searches: MuseSearch::defaults(),
            pacer: Pacer::new(settings.page_delay),
            max_pages: settings.max_pages.max(1),
            listing: Snapshot::new(settings.snapshot_ttl),
        }
    }

    async fn download(&self) -> Result<Vec<RawEntry>, AppError> {
        let mut entries = Vec::new();
        let mut first_error = None;
        let mut any_page_ok = false;

        for search in &self.searches {
            // Pages are 0-based.
            for page in 0..self.max_pages {
                self.pacer.wait().await;
                let result = match search.page_url(page) {
                    Ok(url) => self.client.get_json::<Page>(url, &[]).await,
                    Err(e) => Err(e),
                };
                match result {
                    Ok(p) if p.results.is_empty() => {
                        any_page_ok = true;
                        break;
                    }
                    Ok(p) => {
                        any_page_ok = true;
                        entries.extend(p.results.into_iter().map(|l| l.into_entry(&self.cleaner)));
                    }
                    Err(e) => {
                        tracing::warn!(source = NAME, page, error = %e, "Listing page failed");
                        first_error.get_or_insert(e);
                        break;
                    }
                }
            }
        }

        match first_error {
            Some(e) if !any_page_ok => Err(e),
            _ => Ok(entries),
        }
    }
}

/// Entries whose title contains `term`, case-insensitively.
fn select(entries: &[RawEntry], term: &str) -> Vec<RawEntry> {
    let term = term.trim().to_lowercase();
    entries
        .iter()
        .filter(|e| {
            e.title
                .as_deref()
                .is_some_and(|title| title.to_lowercase().contains(&term))
        })
        .cloned()
        .collect()
}

#[async_trait]
impl JobSource for TheMuseSource {
    fn name(&self) -> &str {
        NAME
    }

    async fn fetch(&self, query: &SearchQuery) -> SourceOutcome {
        let listing = self.listing.get_or_load(|| self.download()).await;
        SourceOutcome::from_result(NAME, listing.map(|entries| select(&entries, &query.term)))
    }
}
