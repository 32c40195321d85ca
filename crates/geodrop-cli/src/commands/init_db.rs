//! `geodrop init-db` - prepare the ledger schema

use anyhow::{Context, Result};
use colored::Colorize;

use geodrop_ingest::config::{
    DatabaseConfig, DEFAULT_DATABASE_ACQUIRE_TIMEOUT_SECS, DEFAULT_DATABASE_MAX_CONNECTIONS,
};
use geodrop_ingest::db;

pub async fn execute(database_url: &str) -> Result<()> {
    let config = DatabaseConfig {
        url: database_url.to_string(),
        max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
        acquire_timeout_secs: DEFAULT_DATABASE_ACQUIRE_TIMEOUT_SECS,
    };

    let pool = db::create_pool(&config).context("invalid database URL")?;
    db::run_migrations(&pool)
        .await
        .context("could not apply ledger migrations")?;

    println!("{} ledger schema is up to date", "OK".green().bold());
    Ok(())
}
