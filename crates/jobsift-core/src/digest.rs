//! Plain-text run digest handed to whatever delivers notifications.

use std::fmt::Write as _;

use serde::Serialize;

use crate::aggregate::jobs_by_source;
use crate::models::{Job, RunRecord};

/// Jobs listed per source before the remainder is summarized.
pub const MAX_JOBS_PER_SOURCE: usize = 20;

/// Sources named in the summary block.
const MAX_SOURCES_LISTED: usize = 5;

const RULE_WIDTH: usize = 70;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Digest {
    pub subject: String,
    pub body: String,
}

/// Render the digest for one run. Produced even when nothing is new, as a
/// confirmation that the run happened.
pub fn render_digest(record: &RunRecord, new_jobs: &[Job], area: &str) -> Digest {
    let subject = format!("{} new job listings near {}", new_jobs.len(), area);
    let heavy = "=".repeat(RULE_WIDTH);
    let light = "-".repeat(RULE_WIDTH);

    let sources: Vec<&str> = record
        .sources
        .iter()
        .take(MAX_SOURCES_LISTED)
        .map(String::as_str)
        .collect();

    let mut body = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(body, "Job Alert - {}", record.run_at.format("%B %d, %Y"));
    let _ = writeln!(body, "Location: {area}");
    let _ = writeln!(body);
    let _ = writeln!(body, "{heavy}\nSUMMARY\n{heavy}");
    let _ = writeln!(body, "Total Jobs Found: {}", record.jobs_found);
    let _ = writeln!(body, "New Jobs: {}", record.new_jobs);
    let _ = writeln!(body, "Queries Processed: {}", record.queries_processed);
    let _ = writeln!(body, "Sources With Results: {}", sources.join(", "));
    let _ = writeln!(body);
    let _ = writeln!(body, "{heavy}\nNEW JOBS\n{heavy}");

    for (source, jobs) in jobs_by_source(new_jobs) {
        let _ = writeln!(body, "\n{source}\n{light}");
        for (i, job) in jobs.iter().take(MAX_JOBS_PER_SOURCE).enumerate() {
            let _ = writeln!(body, "{}. {} + {}", i + 1, job.title, job.company);
            let _ = writeln!(body, "   Location: {}", job.location);
            let _ = writeln!(body, "   Salary: {}", job.salary);
            let _ = writeln!(body, "   Apply: {}\n", job.url);
        }
        if jobs.len() > MAX_JOBS_PER_SOURCE {
            let _ = writeln!(
                body,
                "   ... and {} more from {source}\n",
                jobs.len() - MAX_JOBS_PER_SOURCE
            );
        }
    }

    let _ = writeln!(body, "\n{heavy}");
    let _ = writeln!(body, "Total new opportunities: {}", new_jobs.len());
    let _ = writeln!(body, "Run completed: {}", record.run_at.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(body, "{heavy}");

    Digest { subject, body }
}
