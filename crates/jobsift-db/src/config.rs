use std::time::Duration;

use jobsift_core::AppError;

const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection pool settings for the job catalog.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
        }
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections.max(1);
        self
    }

    /// Read configuration from environment variables.
    ///
    /// - `DATABASE_URL` (required)
    /// - `DATABASE_MAX_CONNECTIONS` (optional, defaults to 5)
    /// - `DATABASE_ACQUIRE_TIMEOUT_SECS` (optional, defaults to 10)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let url = lookup("DATABASE_URL").filter(|u| !u.trim().is_empty()).ok_or_else(|| {
            AppError::ConfigError("DATABASE_URL not set. Use --dry-run to run without a database.".into())
        })?;

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            None => DEFAULT_MAX_CONNECTIONS,
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(AppError::ConfigError(format!(
                        "Invalid DATABASE_MAX_CONNECTIONS '{raw}': must be a positive integer"
                    )));
                }
            },
        };

        let acquire_timeout = match lookup("DATABASE_ACQUIRE_TIMEOUT_SECS") {
            None => DEFAULT_ACQUIRE_TIMEOUT,
            Some(raw) => raw.trim().parse::<u64>().map(Duration::from_secs).map_err(|_| {
                AppError::ConfigError(format!(
                    "Invalid DATABASE_ACQUIRE_TIMEOUT_SECS '{raw}': must be whole seconds"
                ))
            })?,
        };

        Ok(Self {
            url,
            max_connections,
            acquire_timeout,
        })
    }
}
