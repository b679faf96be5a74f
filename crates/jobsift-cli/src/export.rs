use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::ValueEnum;
use jobsift_core::Job;
use serde::Serialize;

const STEM: &str = "daily_jobs";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }
}

/// Flat CSV row; the salary is written in its display form.
#[derive(Serialize)]
struct CsvRow<'a> {
    title: &'a str,
    company: &'a str,
    location: &'a str,
    salary: String,
    job_type: &'a str,
    posted_date: &'a str,
    url: &'a str,
    source: &'a str,
    search_query: &'a str,
    description: &'a str,
}

impl<'a> From<&'a Job> for CsvRow<'a> {
    fn from(job: &'a Job) -> Self {
        Self {
            title: &job.title,
            company: &job.company,
            location: &job.location,
            salary: job.salary.to_string(),
            job_type: &job.job_type,
            posted_date: &job.posted,
            url: &job.url,
            source: &job.source,
            search_query: &job.query,
            description: &job.description,
        }
    }
}

/// Write `jobs` to `daily_jobs_YYYYMMDD.<ext>` and to the stable
/// `daily_jobs.<ext>` in `dir`. Returns both paths, dated file first.
pub fn export_jobs(
    jobs: &[Job],
    dir: &Path,
    format: ExportFormat,
    date: NaiveDate,
) -> Result<[PathBuf; 2]> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export directory: {}", dir.display()))?;

    let bytes = render(jobs, format)?;
    let ext = format.extension();
    let dated = dir.join(format!("{STEM}_{}.{ext}", date.format("%Y%m%d")));
    let stable = dir.join(format!("{STEM}.{ext}"));

    for path in [&dated, &stable] {
        fs::write(path, &bytes)
            .with_context(|| format!("Failed to write export file: {}", path.display()))?;
    }

    tracing::info!(jobs = jobs.len(), path = %dated.display(), "Exported jobs");
    Ok([dated, stable])
}

fn render(jobs: &[Job], format: ExportFormat) -> Result<Vec<u8>> {
    match format {
        ExportFormat::Json => {
            let mut bytes = serde_json::to_vec_pretty(jobs).context("Failed to encode jobs as JSON")?;
            bytes.push(b'\n');
            Ok(bytes)
        }
        ExportFormat::Csv => {
            let mut writer = csv::Writer::from_writer(Vec::new());
            for job in jobs {
                writer
                    .serialize(CsvRow::from(job))
                    .context("Failed to encode job as CSV")?;
            }
            writer.into_inner().context("Failed to flush CSV output")
        }
    }
}
