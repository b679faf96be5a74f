pub mod adzuna;
pub mod cleaner;
pub mod config;
pub mod google_jobs;
pub mod http;
pub mod jsearch;
pub mod remotive;
pub mod sources;
pub mod themuse;
pub mod usajobs;

pub use adzuna::AdzunaSource;
pub use cleaner::DescriptionCleaner;
pub use config::{ClientSettings, SourceCredentials};
pub use google_jobs::GoogleJobsSource;
pub use http::{ApiClient, Pacer};
pub use jsearch::JSearchSource;
pub use remotive::RemotiveSource;
pub use sources::{SOURCE_NAMES, build_sources, select_sources};
pub use themuse::{MuseSearch, TheMuseSource};
pub use usajobs::UsaJobsSource;
