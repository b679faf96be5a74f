use std::collections::BTreeSet;

use chrono::{Duration, Utc};
use jobsift_core::aggregate::{Aggregator, AggregatorConfig, TracingRunReporter};
use jobsift_core::models::RunRecord;
use jobsift_core::retry::RetryPolicy;
use jobsift_core::traits::JobCatalog;

use crate::common::setup_test_db;

fn record(minutes_ago: i64, new_jobs: usize, sources: &[&str]) -> RunRecord {
    RunRecord {
        run_at: Utc::now() - Duration::minutes(minutes_ago),
        jobs_found: 12,
        new_jobs,
        queries_processed: 10,
        sources: sources.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
    }
}

#[tokio::test]
async fn recent_runs_are_newest_first() {
    let (db, _container) = setup_test_db().await;
    let catalog = db.catalog();

    catalog.record_run(&record(30, 4, &["Adzuna"])).await.unwrap();
    let latest = catalog
        .record_run(&record(5, 0, &["Remotive", "Adzuna"]))
        .await
        .unwrap();
    catalog.record_run(&record(60, 9, &[])).await.unwrap();

    let runs = catalog.recent_runs(2).await.unwrap();
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].id, latest);
    assert_eq!(runs[0].new_jobs, 0);
    assert_eq!(runs[0].sources, ["Adzuna", "Remotive"]);
    assert_eq!(runs[1].new_jobs, 4);
    assert_eq!(db.run_repo().count().await.unwrap(), 3);
}

#[tokio::test]
async fn aggregation_with_no_sources_still_records_a_run() {
    let (db, _container) = setup_test_db().await;
    let config = AggregatorConfig::new("Willow Grove, PA 19090", 64).with_retry(RetryPolicy::none());
    let aggregator = Aggregator::new(db.catalog(), config);

    let outcome = aggregator
        .run(&["Product Owner".to_string()], &TracingRunReporter)
        .await
        .unwrap();

    assert_eq!(outcome.record.new_jobs, 0);
    let runs = db.catalog().recent_runs(10).await.unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].id, outcome.run_id);
    assert!(runs[0].sources.is_empty());
}
