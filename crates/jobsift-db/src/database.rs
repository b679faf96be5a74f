use jobsift_core::AppError;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::catalog::PgCatalog;
use crate::config::DatabaseConfig;
use crate::job_repository::JobRepository;
use crate::run_repository::RunRepository;

/// Owns the connection pool, runs migrations, and vends repositories.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.url)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to connect: {e}")))?;

        tracing::debug!(max_connections = config.max_connections, "Connected to PostgreSQL");
        Ok(Self { pool })
    }

    /// Create a `Database` from an existing pool (useful for testing).
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run all pending migrations.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Migration failed: {e}")))?;
        Ok(())
    }

    pub fn job_repo(&self) -> JobRepository {
        JobRepository::new(self.pool.clone())
    }

    pub fn run_repo(&self) -> RunRepository {
        RunRepository::new(self.pool.clone())
    }

    /// The catalog the aggregator admits jobs into.
    pub fn catalog(&self) -> PgCatalog {
        PgCatalog::new(self.job_repo(), self.run_repo())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
