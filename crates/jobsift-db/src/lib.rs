pub mod catalog;
pub mod config;
pub mod database;
pub mod job_repository;
pub mod run_repository;

pub use catalog::PgCatalog;
pub use config::DatabaseConfig;
pub use database::Database;
pub use job_repository::{JobRepository, StoredJob};
pub use run_repository::RunRepository;
