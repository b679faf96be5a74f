use std::sync::Arc;
use std::time::{Duration, Instant};

use jobsift_core::error::AppError;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use url::Url;

/// Default per-request timeout for provider APIs.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(15);

/// JSON-over-HTTP client shared by all source adapters.
///
/// Every request carries the client timeout. Errors are classified the same
/// way for every provider so the retry policy and circuit breaker can reason
/// about them.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    timeout_secs: u64,
}

impl ApiClient {
    pub fn new() -> Result<Self, AppError> {
        Self::with_timeout(DEFAULT_HTTP_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, AppError> {
        let timeout_secs = timeout.as_secs();
        let client = Client::builder()
            .user_agent("Jobsift/0.1 (job listing aggregator)")
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            timeout_secs,
        })
    }

    /// GET `url` and decode the body as JSON.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        headers: &[(&str, &str)],
    ) -> Result<T, AppError> {
        let shown = redacted(&url);
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Timeout(self.timeout_secs)
            } else if e.is_connect() {
                AppError::NetworkError(format!("Connection failed: {}", e.without_url()))
            } else {
                AppError::HttpError(e.without_url().to_string())
            }
        })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(AppError::RateLimitExceeded);
        }
        if !status.is_success() {
            return Err(AppError::HttpError(format!(
                "HTTP {} for {}",
                status.as_u16(),
                shown
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::HttpError(format!("Failed to read response body: {e}")))?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// URL without its query string. Query strings carry API keys.
pub fn redacted(url: &Url) -> String {
    let mut shown = url.clone();
    shown.set_query(None);
    shown.to_string()
}

/// Build a URL with query parameters, mapping parse failures to config errors.
pub fn endpoint<I, K, V>(base: &str, params: I) -> Result<Url, AppError>
where
    I: IntoIterator,
    I::Item: std::borrow::Borrow<(K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    Url::parse_with_params(base, params)
        .map_err(|e| AppError::ConfigError(format!("Invalid endpoint {base}: {e}")))
}

/// Minimum spacing between consecutive requests of one adapter.
///
/// Pages are fetched sequentially; the pacer sleeps just long enough that two
/// requests are never closer than `delay`.
#[derive(Debug, Clone)]
pub struct Pacer {
    delay: Duration,
    last_request: Arc<Mutex<Option<Instant>>>,
}

impl Pacer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Wait for the slot, then claim it.
    pub async fn wait(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(at) = *last {
            let elapsed = at.elapsed();
            if elapsed < self.delay {
                let sleep_for = self.delay - elapsed;
                tracing::debug!(sleep_ms = %sleep_for.as_millis(), "Pacing request");
                tokio::time::sleep(sleep_for).await;
            }
        }
        *last = Some(Instant::now());
    }
}

/// A query-independent listing snapshot, refreshed at most once per `ttl`.
///
/// Used by providers whose API cannot search by keyword, so the same listing
/// page is not downloaded again for every query term of a run.
#[derive(Debug, Clone)]
pub struct Snapshot<T> {
    ttl: Duration,
    slot: Arc<Mutex<Option<(Instant, Arc<Vec<T>>)>>>,
}

impl<T> Snapshot<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Arc::new(Mutex::new(None)),
        }
    }

    /// The cached items, or the result of `load` if the cache is empty or
    /// stale. Failed loads are not cached.
    pub async fn get_or_load<F, Fut>(&self, load: F) -> Result<Arc<Vec<T>>, AppError>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<Vec<T>, AppError>>,
    {
        let mut slot = self.slot.lock().await;
        if let Some((at, items)) = slot.as_ref()
            && at.elapsed() < self.ttl
        {
            return Ok(Arc::clone(items));
        }

        let items = Arc::new(load().await?);
        *slot = Some((Instant::now(), Arc::clone(&items)));
        Ok(items)
    }
}
