use std::sync::Arc;

use jobsift_core::error::AppError;
use jobsift_core::traits::JobSource;

use crate::adzuna::AdzunaSource;
use crate::config::{ClientSettings, SourceCredentials};
use crate::google_jobs::GoogleJobsSource;
use crate::http::ApiClient;
use crate::jsearch::JSearchSource;
use crate::remotive::RemotiveSource;
use crate::themuse::TheMuseSource;
use crate::usajobs::UsaJobsSource;

/// Names of every provider [`build_sources`] knows, in call order.
pub const SOURCE_NAMES: [&str; 6] = [
    crate::jsearch::NAME,
    crate::adzuna::NAME,
    crate::google_jobs::NAME,
    crate::usajobs::NAME,
    crate::remotive::NAME,
    crate::themuse::NAME,
];

/// Build every provider adapter over one shared HTTP client.
///
/// Adapters without credentials are still built; they answer `Skipped`.
pub fn build_sources(
    credentials: &SourceCredentials,
    settings: &ClientSettings,
) -> Result<Vec<Arc<dyn JobSource>>, AppError> {
    let client = ApiClient::with_timeout(settings.http_timeout)?;

    let sources: Vec<Arc<dyn JobSource>> = vec![
        Arc::new(JSearchSource::new(client.clone(), credentials)),
        Arc::new(AdzunaSource::new(client.clone(), credentials, settings)),
        Arc::new(GoogleJobsSource::new(client.clone(), credentials)),
        Arc::new(UsaJobsSource::new(client.clone(), credentials, settings)),
        Arc::new(RemotiveSource::new(client.clone(), settings)),
        Arc::new(TheMuseSource::new(client, settings)),
    ];
    Ok(sources)
}

/// Keep only the sources whose names match `only` (case-insensitive).
/// An empty filter keeps everything.
pub fn select_sources(
    sources: Vec<Arc<dyn JobSource>>,
    only: &[String],
) -> Result<Vec<Arc<dyn JobSource>>, AppError> {
    if only.is_empty() {
        return Ok(sources);
    }
    if let Some(unknown) = only
        .iter()
        .find(|name| !sources.iter().any(|s| s.name().eq_ignore_ascii_case(name)))
    {
        return Err(AppError::ConfigError(format!(
            "Unknown source '{unknown}'. Known sources: {}",
            SOURCE_NAMES.join(", ")
        )));
    }
    Ok(sources
        .into_iter()
        .filter(|s| only.iter().any(|name| s.name().eq_ignore_ascii_case(name)))
        .collect())
}
