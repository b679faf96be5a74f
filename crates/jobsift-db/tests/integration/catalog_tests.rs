use chrono::{Duration, Utc};
use jobsift_core::identity::JobIdentity;
use jobsift_core::models::{Job, RawEntry, Salary};
use jobsift_core::normalize::normalize;
use jobsift_core::traits::JobCatalog;

use crate::common::setup_test_db;

fn job(title: &str, company: &str, source: &str) -> Job {
    let raw = RawEntry::new(title, company)
        .with_location("Horsham, PA")
        .with_salary(Salary::from_range(Some(95_000.0), Some(125_000.0)))
        .with_url("https://jobs.example/1")
        .with_description("Own the platform roadmap");
    normalize(&raw, source, "Technical Product Manager").unwrap()
}

#[tokio::test]
async fn admit_is_insert_if_absent() {
    let (db, _container) = setup_test_db().await;
    let catalog = db.catalog();
    let j = job("Technical Product Manager", "Comcast", "Adzuna");
    let id = JobIdentity::of(&j);

    assert!(catalog.admit(&j, &id).await.unwrap());
    assert!(!catalog.admit(&j, &id).await.unwrap());
    assert!(catalog.contains(&id).await.unwrap());
    assert_eq!(catalog.job_count().await.unwrap(), 1);
}

#[tokio::test]
async fn identities_round_trip_through_the_table() {
    let (db, _container) = setup_test_db().await;
    let catalog = db.catalog();

    let a = job("Product Owner", "Vanguard", "Adzuna");
    let b = job("Product Owner", "Vanguard", "Remotive");
    for j in [&a, &b] {
        catalog.admit(j, &JobIdentity::of(j)).await.unwrap();
    }

    let mut loaded = catalog.load_identities().await.unwrap();
    loaded.sort();
    let mut expected = vec![JobIdentity::of(&a), JobIdentity::of(&b)];
    expected.sort();
    assert_eq!(loaded, expected);
}

#[tokio::test]
async fn stored_job_keeps_every_field() {
    let (db, _container) = setup_test_db().await;
    let j = job("Growth Product Manager", "Hotjar", "Remotive");
    let id = JobIdentity::of(&j);
    db.catalog().admit(&j, &id).await.unwrap();

    let stored = db
        .job_repo()
        .admitted_since(Utc::now() - Duration::hours(1))
        .await
        .unwrap();

    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].identity, id);
    assert_eq!(stored[0].job, j);
}

#[tokio::test]
async fn counts_per_source() {
    let (db, _container) = setup_test_db().await;
    let catalog = db.catalog();
    for (title, source) in [("PM", "Adzuna"), ("PO", "Adzuna"), ("PM", "The Muse")] {
        let j = job(title, "Acme", source);
        catalog.admit(&j, &JobIdentity::of(&j)).await.unwrap();
    }

    let counts = db.job_repo().count_by_source().await.unwrap();
    assert_eq!(
        counts,
        vec![("Adzuna".to_string(), 2), ("The Muse".to_string(), 1)]
    );
}
