use thiserror::Error;

/// Application-wide error types for Jobsift.
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP request failed or returned a non-success status.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Rate limit exceeded (HTTP 429).
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Network/connection error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Persistence layer failed. Fatal to the current run.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic error.
    #[error("{0}")]
    Generic(String),
}

impl AppError {
    /// Returns true if this error is transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::NetworkError(_) | AppError::Timeout(_) | AppError::RateLimitExceeded => true,
            AppError::HttpError(msg) => {
                msg.contains("HTTP 5") || msg.contains("timeout") || msg.contains("reset")
            }
            _ => false,
        }
    }

    /// Returns true if this error should count against a source's circuit breaker.
    pub fn should_trip_circuit(&self) -> bool {
        match self {
            AppError::NetworkError(_) | AppError::Timeout(_) | AppError::RateLimitExceeded => true,
            AppError::HttpError(msg) => {
                msg.contains("HTTP 5") || msg.contains("timeout") || msg.contains("connect")
            }
            _ => false,
        }
    }
}

/// A failure captured at the boundary of one source adapter.
///
/// Never escapes the orchestrator: it is logged and counted against the
/// source in the run's [`SourceReport`](crate::aggregate::SourceReport).
#[derive(Error, Debug)]
#[error("{source_name}: {cause}")]
pub struct AdapterError {
    pub source_name: String,
    pub cause: AppError,
}

impl AdapterError {
    pub fn new(source_name: impl Into<String>, cause: AppError) -> Self {
        Self {
            source_name: source_name.into(),
            cause,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.cause.is_retryable()
    }
}
