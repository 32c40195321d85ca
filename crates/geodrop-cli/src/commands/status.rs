//! `geodrop status` - list ledger rows

use anyhow::{Context, Result};
use colored::{ColoredString, Colorize};

use geodrop_ingest::config::{
    DatabaseConfig, DEFAULT_DATABASE_ACQUIRE_TIMEOUT_SECS, DEFAULT_DATABASE_MAX_CONNECTIONS,
};
use geodrop_ingest::db;
use geodrop_ingest::ledger::{FileRecord, Ledger};

use crate::OutputFormat;

pub async fn execute(database_url: &str, limit: i64, format: OutputFormat) -> Result<()> {
    let config = DatabaseConfig {
        url: database_url.to_string(),
        max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
        acquire_timeout_secs: DEFAULT_DATABASE_ACQUIRE_TIMEOUT_SECS,
    };

    let pool = db::create_pool(&config).context("invalid database URL")?;
    let ledger = Ledger::new(pool);
    let records = ledger
        .list_records(limit)
        .await
        .context("could not read the ledger")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
        OutputFormat::Text => print_table(&records),
    }
    Ok(())
}

fn print_table(records: &[FileRecord]) {
    if records.is_empty() {
        println!("No uploads recorded yet.");
        return;
    }

    // Cells are padded before colorizing; the ANSI escape bytes would
    // otherwise count toward the format width and break the columns.
    println!(
        "{} {} {} {} RESUBMITTED",
        format!("{:<6}", "ID").bold(),
        format!("{:<40}", "FILE").bold(),
        format!("{:<12}", "STATUS").bold(),
        format!("{:<20}", "UPLOADED AT").bold()
    );
    for record in records {
        println!(
            "{:<6} {:<40} {} {:<20} {}",
            record.id,
            record.file_name,
            status_cell(&record.status),
            record.uploaded_at.format("%Y-%m-%d %H:%M:%S"),
            record.is_updated.as_deref().unwrap_or("-")
        );
    }
    println!();
    println!("{} upload(s)", records.len());
}

/// Status column cell: fixed width, colored by lifecycle state.
fn status_cell(status: &str) -> ColoredString {
    let cell = format!("{status:<12}");
    match status {
        "processed" => cell.green(),
        "added" => cell.yellow(),
        _ => cell.normal(),
    }
}
