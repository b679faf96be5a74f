pub mod aggregate;
pub mod catalog;
pub mod circuit_breaker;
pub mod dedup;
pub mod digest;
pub mod error;
pub mod filter;
pub mod identity;
pub mod models;
pub mod normalize;
pub mod poller;
pub mod profile;
pub mod retry;
pub mod traits;

#[cfg(test)]
pub(crate) mod testutil;

pub use aggregate::{
    Aggregator, AggregatorConfig, RunEvent, RunOutcome, RunPhase, RunReporter, SourceReport,
    TracingRunReporter,
};
pub use catalog::MemoryCatalog;
pub use error::{AdapterError, AppError};
pub use filter::KeywordFilter;
pub use identity::JobIdentity;
pub use models::{Job, RawEntry, RunRecord, Salary, StoredRun, compute_hash};
pub use poller::{PollSummary, PollerConfig, poll};
pub use profile::SearchProfile;
pub use retry::RetryPolicy;
pub use traits::{JobCatalog, JobSource, SearchQuery, SourceOutcome};
