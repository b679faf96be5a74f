use std::fmt;
use std::time::Duration;

use crate::http::DEFAULT_HTTP_TIMEOUT;

/// Provider credentials. A missing field degrades its source to `Skipped`.
#[derive(Clone, Default)]
pub struct SourceCredentials {
    pub jsearch_api_key: Option<String>,
    pub serp_api_key: Option<String>,
    pub adzuna_app_id: Option<String>,
    pub adzuna_app_key: Option<String>,
    pub usajobs_email: Option<String>,
    pub usajobs_api_key: Option<String>,
}

impl SourceCredentials {
    /// Read every credential from its conventional environment variable.
    /// Empty values count as absent.
    pub fn from_env() -> Self {
        Self {
            jsearch_api_key: env_opt("JSEARCH_API_KEY"),
            serp_api_key: env_opt("SERP_API_KEY"),
            adzuna_app_id: env_opt("ADZUNA_APP_ID"),
            adzuna_app_key: env_opt("ADZUNA_APP_KEY"),
            usajobs_email: env_opt("USAJOBS_EMAIL"),
            usajobs_api_key: env_opt("USAJOBS_API_KEY"),
        }
    }

    /// Drop blank values, e.g. from `KEY=` lines in a `.env` file.
    pub fn normalized(self) -> Self {
        Self {
            jsearch_api_key: non_blank(self.jsearch_api_key),
            serp_api_key: non_blank(self.serp_api_key),
            adzuna_app_id: non_blank(self.adzuna_app_id),
            adzuna_app_key: non_blank(self.adzuna_app_key),
            usajobs_email: non_blank(self.usajobs_email),
            usajobs_api_key: non_blank(self.usajobs_api_key),
        }
    }
}

fn env_opt(name: &str) -> Option<String> {
    non_blank(std::env::var(name).ok())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn mask(value: &Option<String>) -> &'static str {
    if value.is_some() { "<set>" } else { "<unset>" }
}

impl fmt::Debug for SourceCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceCredentials")
            .field("jsearch_api_key", &mask(&self.jsearch_api_key))
            .field("serp_api_key", &mask(&self.serp_api_key))
            .field("adzuna_app_id", &mask(&self.adzuna_app_id))
            .field("adzuna_app_key", &mask(&self.adzuna_app_key))
            .field("usajobs_email", &mask(&self.usajobs_email))
            .field("usajobs_api_key", &mask(&self.usajobs_api_key))
            .finish()
    }
}

/// Transport and pagination knobs shared by every adapter.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub http_timeout: Duration,
    /// Pause between consecutive page requests of one adapter.
    pub page_delay: Duration,
    /// Upper bound on pages fetched per query by paginating adapters.
    pub max_pages: u32,
    /// How long keyword-less providers reuse a downloaded listing.
    pub snapshot_ttl: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            page_delay: Duration::from_millis(500),
            max_pages: 2,
            snapshot_ttl: Duration::from_secs(600),
        }
    }
}
