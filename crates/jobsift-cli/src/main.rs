mod export;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use jobsift_client::{ClientSettings, SOURCE_NAMES, SourceCredentials, build_sources, select_sources};
use jobsift_core::circuit_breaker::CircuitBreakerConfig;
use jobsift_core::digest::render_digest;
use jobsift_core::traits::JobCatalog;
use jobsift_core::{
    Aggregator, AggregatorConfig, JobSource, KeywordFilter, MemoryCatalog, PollerConfig,
    RetryPolicy, RunOutcome, SearchProfile, TracingRunReporter, poll,
};
use jobsift_db::{Database, DatabaseConfig};

use crate::export::{ExportFormat, export_jobs};

#[derive(Parser)]
#[command(name = "jobsift", version, about = "Job listing aggregator with cross-run deduplication")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one aggregation pass, export the matching new jobs and print the digest
    Run(RunArgs),

    /// Run aggregation passes on a fixed interval until Ctrl-C
    Watch {
        #[command(flatten)]
        run: RunArgs,

        /// Seconds between the end of one pass and the start of the next
        #[arg(long, default_value_t = 86_400)]
        interval_secs: u64,

        /// Stop after this many passes
        #[arg(long)]
        max_runs: Option<u32>,
    },

    /// Show recent aggregation runs
    History {
        /// Number of runs to show
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Show catalog size per source
    Stats,

    /// List the known job sources
    Sources,
}

#[derive(Args)]
struct RunArgs {
    /// Search profile JSON file (queries, location, keywords). Built-in default when omitted
    #[arg(short, long)]
    profile: Option<PathBuf>,

    /// Override the profile's query terms (repeatable)
    #[arg(short, long = "query", value_name = "TERM")]
    queries: Vec<String>,

    /// Override the profile's location
    #[arg(long)]
    location: Option<String>,

    /// Only call these sources (repeatable, case-insensitive)
    #[arg(long = "source", value_name = "NAME")]
    sources: Vec<String>,

    /// Use an in-memory catalog instead of PostgreSQL
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Directory for the daily_jobs export files
    #[arg(long, default_value = ".")]
    export_dir: PathBuf,

    /// Export file format
    #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
    format: ExportFormat,

    /// Skip writing export files
    #[arg(long, default_value_t = false)]
    no_export: bool,

    /// Deadline for one source call, in seconds
    #[arg(long, default_value_t = 60)]
    source_timeout_secs: u64,

    /// HTTP client timeout, in seconds
    #[arg(long, default_value_t = 15)]
    http_timeout_secs: u64,

    /// Pages fetched per query by paginating sources
    #[arg(long, default_value_t = 2)]
    max_pages: u32,

    /// Attempts per source call, including the first
    #[arg(long, default_value_t = 2)]
    attempts: u32,

    #[command(flatten)]
    credentials: CredentialArgs,
}

#[derive(Args)]
struct CredentialArgs {
    /// RapidAPI key for JSearch
    #[arg(long, env = "JSEARCH_API_KEY", hide_env_values = true)]
    jsearch_api_key: Option<String>,

    /// SerpApi key for Google Jobs
    #[arg(long, env = "SERP_API_KEY", hide_env_values = true)]
    serp_api_key: Option<String>,

    #[arg(long, env = "ADZUNA_APP_ID", hide_env_values = true)]
    adzuna_app_id: Option<String>,

    #[arg(long, env = "ADZUNA_APP_KEY", hide_env_values = true)]
    adzuna_app_key: Option<String>,

    /// Contact email sent as the USAJobs User-Agent
    #[arg(long, env = "USAJOBS_EMAIL", hide_env_values = true)]
    usajobs_email: Option<String>,

    #[arg(long, env = "USAJOBS_API_KEY", hide_env_values = true)]
    usajobs_api_key: Option<String>,
}

impl From<CredentialArgs> for SourceCredentials {
    fn from(args: CredentialArgs) -> Self {
        SourceCredentials {
            jsearch_api_key: args.jsearch_api_key,
            serp_api_key: args.serp_api_key,
            adzuna_app_id: args.adzuna_app_id,
            adzuna_app_key: args.adzuna_app_key,
            usajobs_email: args.usajobs_email,
            usajobs_api_key: args.usajobs_api_key,
        }
        .normalized()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("jobsift=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => {
            let plan = Plan::from_args(args)?;
            if plan.dry_run {
                let aggregator = plan.aggregator(MemoryCatalog::new());
                cmd_run(&aggregator, &plan).await?;
            } else {
                let db = connect_db().await?;
                let aggregator = plan.aggregator(db.catalog());
                cmd_run(&aggregator, &plan).await?;
            }
        }
        Commands::Watch {
            run,
            interval_secs,
            max_runs,
        } => {
            let plan = Plan::from_args(run)?;
            let mut poller = PollerConfig::new(Duration::from_secs(interval_secs));
            if let Some(max_runs) = max_runs {
                poller = poller.with_max_runs(max_runs);
            }
            if plan.dry_run {
                let aggregator = plan.aggregator(MemoryCatalog::new());
                cmd_watch(&aggregator, &plan, &poller).await;
            } else {
                let db = connect_db().await?;
                let aggregator = plan.aggregator(db.catalog());
                cmd_watch(&aggregator, &plan, &poller).await;
            }
        }
        Commands::History { limit } => {
            let db = connect_db().await?;
            cmd_history(&db, limit).await?;
        }
        Commands::Stats => {
            let db = connect_db().await?;
            cmd_stats(&db).await?;
        }
        Commands::Sources => {
            for name in SOURCE_NAMES {
                println!("{name}");
            }
        }
    }

    Ok(())
}

/// Connect to PostgreSQL using DATABASE_URL and apply migrations.
async fn connect_db() -> Result<Database> {
    let config = DatabaseConfig::from_env()?;
    let db = Database::connect(&config)
        .await
        .context("Failed to connect to database")?;
    db.migrate().await.context("Failed to run migrations")?;
    Ok(db)
}

/// Everything one pass needs, resolved from the command line and profile.
struct Plan {
    queries: Vec<String>,
    area: String,
    filter: KeywordFilter,
    sources: Vec<Arc<dyn JobSource>>,
    config: AggregatorConfig,
    dry_run: bool,
    export: Option<(PathBuf, ExportFormat)>,
}

impl Plan {
    fn from_args(args: RunArgs) -> Result<Self> {
        let mut profile = match &args.profile {
            Some(path) => SearchProfile::from_file(path)
                .with_context(|| format!("Failed to load profile: {}", path.display()))?,
            None => SearchProfile::default(),
        };
        if !args.queries.is_empty() {
            profile.queries = args.queries;
        }
        if let Some(location) = args.location {
            profile.location = location;
        }
        profile.validate().context("Invalid search profile")?;

        let settings = ClientSettings {
            http_timeout: Duration::from_secs(args.http_timeout_secs),
            max_pages: args.max_pages.max(1),
            ..ClientSettings::default()
        };
        let credentials = SourceCredentials::from(args.credentials);
        tracing::debug!(?credentials, "Resolved source credentials");

        let sources = build_sources(&credentials, &settings).context("Failed to build sources")?;
        let sources = select_sources(sources, &args.sources)?;

        let config = AggregatorConfig::new(profile.location.clone(), profile.radius_km)
            .with_source_timeout(Duration::from_secs(args.source_timeout_secs))
            .with_retry(RetryPolicy::new(args.attempts, RetryPolicy::default().backoff))
            .with_breaker(CircuitBreakerConfig::default());

        Ok(Self {
            queries: profile.query_terms(),
            area: profile.location.clone(),
            filter: profile.keyword_filter(),
            sources,
            config,
            dry_run: args.dry_run,
            export: (!args.no_export).then_some((args.export_dir, args.format)),
        })
    }

    fn aggregator<C: JobCatalog>(&self, catalog: C) -> Aggregator<C> {
        Aggregator::new(catalog, self.config.clone()).with_sources(self.sources.iter().cloned())
    }

    /// Filter, export and print the digest for a finished pass.
    fn deliver(&self, outcome: &RunOutcome) -> Result<()> {
        let matched = self.filter.apply(&outcome.new_jobs);
        tracing::info!(
            run_id = %outcome.run_id,
            new_jobs = outcome.new_jobs.len(),
            matched = matched.len(),
            "Filtered new jobs"
        );

        for report in &outcome.source_reports {
            tracing::info!(
                source = %report.name,
                fetched = report.fetched,
                admitted = report.admitted,
                duplicates = report.duplicates,
                skipped = report.skipped,
                failures = report.failures,
                "Source summary"
            );
        }

        if let Some((dir, format)) = &self.export {
            let today = chrono::Local::now().date_naive();
            export_jobs(&matched, dir, *format, today)?;
        }

        let digest = render_digest(&outcome.record, &matched, &self.area);
        println!("Subject: {}\n\n{}", digest.subject, digest.body);
        Ok(())
    }
}

async fn cmd_run<C: JobCatalog>(aggregator: &Aggregator<C>, plan: &Plan) -> Result<()> {
    tracing::info!(sources = ?aggregator.source_names(), "Starting aggregation pass");
    let outcome = aggregator
        .run(&plan.queries, &TracingRunReporter)
        .await
        .context("Aggregation run failed")?;
    plan.deliver(&outcome)
}

async fn cmd_watch<C: JobCatalog>(aggregator: &Aggregator<C>, plan: &Plan, poller: &PollerConfig) {
    tracing::info!(sources = ?aggregator.source_names(), "Watching sources");
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Received Ctrl+C, shutting down");
                trigger.cancel();
            }
            Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl+C"),
        }
    });

    let summary = poll(aggregator, &plan.queries, poller, cancel, &TracingRunReporter, |outcome| {
        if let Err(e) = plan.deliver(outcome) {
            tracing::error!(error = %format!("{e:#}"), "Failed to deliver run results");
        }
    })
    .await;

    println!(
        "Stopped after {} completed and {} failed passes",
        summary.runs_completed, summary.runs_failed
    );
}

async fn cmd_history(db: &Database, limit: usize) -> Result<()> {
    let runs = db
        .catalog()
        .recent_runs(limit)
        .await
        .context("Failed to load run history")?;

    if runs.is_empty() {
        println!("No runs recorded yet");
        return Ok(());
    }

    println!("Recent runs:\n");
    for run in &runs {
        let sources = if run.sources.is_empty() {
            "none".to_string()
        } else {
            run.sources.join(", ")
        };
        println!(
            "  {}  found={:<5} new={:<4} queries={:<3} sources: {}",
            run.run_at.format("%Y-%m-%d %H:%M:%S UTC"),
            run.jobs_found,
            run.new_jobs,
            run.queries_processed,
            sources,
        );
    }
    println!("\nTotal: {} runs shown", runs.len());

    Ok(())
}

async fn cmd_stats(db: &Database) -> Result<()> {
    let jobs = db.job_repo();
    let total = jobs.count().await.context("Failed to count jobs")?;
    let by_source = jobs
        .count_by_source()
        .await
        .context("Failed to count jobs per source")?;
    let runs = db.run_repo().count().await.context("Failed to count runs")?;

    println!("Jobs in catalog: {total}");
    println!("Runs recorded:   {runs}\n");
    for (source, count) in &by_source {
        println!("  {count:>6}  {source}");
    }

    Ok(())
}
