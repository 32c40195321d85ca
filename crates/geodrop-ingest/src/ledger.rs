//! Lifecycle ledger backed by the `filetable` table
//!
//! Every archive the watcher sees gets a row keyed by file name. First
//! sighting inserts the row with status `added`; a resubmission of the same
//! name re-flags the existing row instead of inserting a duplicate. The row
//! reaches `processed` only after a successful publish.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use tracing::debug;

/// Lifecycle states written by the daemon.
///
/// `status` is stored as open text so operators can patch rows by hand;
/// these are the values the pipeline itself writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Added,
    Processed,
}

impl FileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::Added => "added",
            FileStatus::Processed => "processed",
        }
    }
}

/// Whether `record_seen` created a new row or re-flagged an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeenOutcome {
    Added,
    Resubmitted,
}

/// One `filetable` row.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FileRecord {
    pub id: i32,
    pub file_name: String,
    /// Resubmission token, set when the same file name arrives again.
    #[sqlx(rename = "isupdated")]
    pub is_updated: Option<String>,
    pub status: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Handle for all `filetable` access. Cheap to clone; shares the pool.
#[derive(Debug, Clone)]
pub struct Ledger {
    pool: PgPool,
}

impl Ledger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record that an archive with this name was seen in the inbox.
    ///
    /// One round trip: inserts the row, or on a name collision stamps
    /// `isupdated` with a fresh resubmission token. `xmax = 0` holds only
    /// for rows created by this statement, which distinguishes the two
    /// cases without a second query.
    pub async fn record_seen(&self, file_name: &str) -> Result<SeenOutcome, sqlx::Error> {
        let token = resubmission_token(file_name);
        let (id, inserted): (i32, bool) = sqlx::query_as(
            r#"
            INSERT INTO filetable (file_name, status)
            VALUES ($1, $2)
            ON CONFLICT (file_name) DO UPDATE SET isupdated = $3
            RETURNING id, (xmax = 0) AS inserted
            "#,
        )
        .bind(file_name)
        .bind(FileStatus::Added.as_str())
        .bind(&token)
        .fetch_one(&self.pool)
        .await?;

        let outcome = if inserted {
            SeenOutcome::Added
        } else {
            SeenOutcome::Resubmitted
        };
        debug!(file = file_name, id, outcome = ?outcome, "ledger sighting recorded");
        Ok(outcome)
    }

    /// Flip the row for this file name to `processed`.
    ///
    /// Returns the number of rows updated; zero means no row existed, which
    /// the caller logs rather than treats as fatal.
    pub async fn mark_processed(&self, file_name: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE filetable SET status = $1 WHERE file_name = $2")
            .bind(FileStatus::Processed.as_str())
            .bind(file_name)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Fetch the row for one file name, if present.
    pub async fn find(&self, file_name: &str) -> Result<Option<FileRecord>, sqlx::Error> {
        sqlx::query_as::<_, FileRecord>(
            "SELECT id, file_name, isupdated, status, uploaded_at FROM filetable WHERE file_name = $1",
        )
        .bind(file_name)
        .fetch_optional(&self.pool)
        .await
    }

    /// List rows in insertion order, oldest first.
    pub async fn list_records(&self, limit: i64) -> Result<Vec<FileRecord>, sqlx::Error> {
        sqlx::query_as::<_, FileRecord>(
            "SELECT id, file_name, isupdated, status, uploaded_at FROM filetable ORDER BY id LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }
}

/// Resubmission marker: file name plus a microsecond UTC timestamp.
fn resubmission_token(file_name: &str) -> String {
    format!("{}_{}", file_name, Utc::now().format("%Y-%m-%d %H:%M:%S%.6f"))
}
