use chrono::{DateTime, Utc};
use jobsift_core::error::AppError;
use jobsift_core::models::{RunRecord, StoredRun};
use sqlx::{PgPool, Pool, Postgres};
use uuid::Uuid;

/// Append-only run history in PostgreSQL.
#[derive(Clone)]
pub struct RunRepository {
    pool: Pool<Postgres>,
}

impl RunRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append a finalized run. Returns the generated UUID.
    pub async fn save(&self, record: &RunRecord) -> Result<Uuid, AppError> {
        let row: (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO scrape_runs (run_date, jobs_found, new_jobs, queries_processed, sources_scraped)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(record.run_at)
        .bind(record.jobs_found as i64)
        .bind(record.new_jobs as i64)
        .bind(record.queries_processed as i64)
        .bind(record.sources_joined())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(row.0)
    }

    /// Most recent runs, newest first.
    pub async fn recent(&self, limit: usize) -> Result<Vec<StoredRun>, AppError> {
        let rows = sqlx::query_as::<_, RunRow>(
            r#"
            SELECT id, run_date, jobs_found, new_jobs, queries_processed, sources_scraped
            FROM scrape_runs
            ORDER BY run_date DESC
            LIMIT $1
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn count(&self) -> Result<u64, AppError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM scrape_runs")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        Ok(row.0.max(0) as u64)
    }
}

#[derive(sqlx::FromRow)]
struct RunRow {
    id: Uuid,
    run_date: DateTime<Utc>,
    jobs_found: i64,
    new_jobs: i64,
    queries_processed: i64,
    sources_scraped: String,
}

impl From<RunRow> for StoredRun {
    fn from(row: RunRow) -> Self {
        StoredRun {
            id: row.id,
            run_at: row.run_date,
            jobs_found: row.jobs_found,
            new_jobs: row.new_jobs,
            queries_processed: row.queries_processed,
            sources: split_sources(&row.sources_scraped),
        }
    }
}

/// Inverse of [`RunRecord::sources_joined`].
fn split_sources(joined: &str) -> Vec<String> {
    joined
        .split(", ")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
