use chrono::{DateTime, Utc};
use jobsift_core::error::AppError;
use jobsift_core::identity::JobIdentity;
use jobsift_core::models::{Job, Salary};
use sqlx::types::Json;
use sqlx::{PgPool, Pool, Postgres};

/// Repository for admitted jobs in PostgreSQL.
#[derive(Clone)]
pub struct JobRepository {
    pool: Pool<Postgres>,
}

impl JobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert the job unless its identity is already stored.
    /// Returns `true` if a row was written.
    pub async fn insert_if_absent(&self, job: &Job, identity: &JobIdentity) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO jobs
                (job_id, title, company, location, salary, job_type, posted_date,
                 url, source, description, search_query)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (job_id) DO NOTHING
            "#,
        )
        .bind(identity.as_str())
        .bind(&job.title)
        .bind(&job.company)
        .bind(&job.location)
        .bind(Json(&job.salary))
        .bind(&job.job_type)
        .bind(&job.posted)
        .bind(&job.url)
        .bind(&job.source)
        .bind(&job.description)
        .bind(&job.query)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn identities(&self) -> Result<Vec<JobIdentity>, AppError> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT job_id FROM jobs")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(rows.into_iter().map(|(id,)| JobIdentity::from_hex(id)).collect())
    }

    pub async fn exists(&self, identity: &JobIdentity) -> Result<bool, AppError> {
        let row: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM jobs WHERE job_id = $1)")
            .bind(identity.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        Ok(row.0)
    }

    pub async fn count(&self) -> Result<u64, AppError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM jobs")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        Ok(row.0.max(0) as u64)
    }

    /// Stored job count per source, largest first.
    pub async fn count_by_source(&self) -> Result<Vec<(String, i64)>, AppError> {
        sqlx::query_as(
            r#"
            SELECT source, COUNT(*) AS n
            FROM jobs
            GROUP BY source
            ORDER BY n DESC, source
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))
    }

    /// Jobs admitted at or after `since`, newest first.
    pub async fn admitted_since(&self, since: DateTime<Utc>) -> Result<Vec<StoredJob>, AppError> {
        let rows = sqlx::query_as::<_, JobRow>(
            r#"
            SELECT job_id, title, company, location, salary, job_type, posted_date,
                   url, source, description, search_query, scraped_at
            FROM jobs
            WHERE scraped_at >= $1
            ORDER BY scraped_at DESC
            "#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

/// A job as read back from the catalog, with its identity and admission time.
#[derive(Debug, Clone)]
pub struct StoredJob {
    pub identity: JobIdentity,
    pub job: Job,
    pub admitted_at: DateTime<Utc>,
}

// -- Internal row type for sqlx deserialization --

#[derive(sqlx::FromRow)]
struct JobRow {
    job_id: String,
    title: String,
    company: String,
    location: String,
    salary: Json<Salary>,
    job_type: String,
    posted_date: String,
    url: String,
    source: String,
    description: String,
    search_query: String,
    scraped_at: DateTime<Utc>,
}

impl From<JobRow> for StoredJob {
    fn from(row: JobRow) -> Self {
        StoredJob {
            identity: JobIdentity::from_hex(row.job_id),
            job: Job {
                title: row.title,
                company: row.company,
                location: row.location,
                salary: row.salary.0,
                job_type: row.job_type,
                url: row.url,
                posted: row.posted_date,
                source: row.source,
                description: row.description,
                query: row.search_query,
            },
            admitted_at: row.scraped_at,
        }
    }
}
