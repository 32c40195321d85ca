//! Ledger integration tests
//!
//! All tests here need a real Postgres and are `#[ignore]`d by default.
//! Point `DATABASE_URL` at a scratch database and run
//! `cargo test -p geodrop-ingest -- --ignored` to exercise them.

use sqlx::PgPool;

use geodrop_ingest::ledger::{Ledger, SeenOutcome};

#[sqlx::test(migrations = "../../migrations")]
#[ignore]
async fn test_first_sighting_inserts_added_row(pool: PgPool) {
    let ledger = Ledger::new(pool);

    let outcome = ledger.record_seen("roof_a.zip").await.unwrap();
    assert_eq!(outcome, SeenOutcome::Added);

    let record = ledger.find("roof_a.zip").await.unwrap().unwrap();
    assert_eq!(record.file_name, "roof_a.zip");
    assert_eq!(record.status, "added");
    assert_eq!(record.is_updated, None);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore]
async fn test_resubmission_reflags_instead_of_duplicating(pool: PgPool) {
    let ledger = Ledger::new(pool);

    assert_eq!(
        ledger.record_seen("roof_a.zip").await.unwrap(),
        SeenOutcome::Added
    );
    assert_eq!(
        ledger.record_seen("roof_a.zip").await.unwrap(),
        SeenOutcome::Resubmitted
    );

    let records = ledger.list_records(10).await.unwrap();
    assert_eq!(records.len(), 1);

    let record = &records[0];
    assert_eq!(record.status, "added");
    assert!(record
        .is_updated
        .as_deref()
        .unwrap()
        .starts_with("roof_a.zip_"));
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore]
async fn test_resubmission_keeps_processed_status(pool: PgPool) {
    let ledger = Ledger::new(pool);

    ledger.record_seen("roof_a.zip").await.unwrap();
    assert_eq!(ledger.mark_processed("roof_a.zip").await.unwrap(), 1);

    // Seeing the file again only stamps the token; status is the
    // publisher's to change.
    ledger.record_seen("roof_a.zip").await.unwrap();
    let record = ledger.find("roof_a.zip").await.unwrap().unwrap();
    assert_eq!(record.status, "processed");
    assert!(record.is_updated.is_some());
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore]
async fn test_mark_processed_reports_missing_rows(pool: PgPool) {
    let ledger = Ledger::new(pool);

    assert_eq!(ledger.mark_processed("ghost.zip").await.unwrap(), 0);

    ledger.record_seen("real.zip").await.unwrap();
    assert_eq!(ledger.mark_processed("real.zip").await.unwrap(), 1);
    let record = ledger.find("real.zip").await.unwrap().unwrap();
    assert_eq!(record.status, "processed");
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore]
async fn test_list_records_in_insertion_order(pool: PgPool) {
    let ledger = Ledger::new(pool);

    for name in ["a.zip", "b.zip", "c.zip"] {
        ledger.record_seen(name).await.unwrap();
    }

    let records = ledger.list_records(10).await.unwrap();
    let names: Vec<_> = records.iter().map(|r| r.file_name.as_str()).collect();
    assert_eq!(names, vec!["a.zip", "b.zip", "c.zip"]);
    assert!(records.windows(2).all(|pair| pair[0].id < pair[1].id));

    let limited = ledger.list_records(2).await.unwrap();
    assert_eq!(limited.len(), 2);
}
