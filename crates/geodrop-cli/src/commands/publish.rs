//! `geodrop publish` - push one archive through the pipeline by hand

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use geodrop_ingest::config::Config;
use geodrop_ingest::db;
use geodrop_ingest::geoserver::GeoServerClient;
use geodrop_ingest::ledger::Ledger;
use geodrop_ingest::watcher::{ArchiveOutcome, IngestWatcher};

pub async fn execute(database_url: &str, archive: &Path) -> Result<()> {
    if !archive.is_file() {
        anyhow::bail!("archive {} does not exist", archive.display());
    }

    let mut config = Config::load()?;
    config.database.url = database_url.to_string();

    let pool = db::create_pool(&config.database)?;
    let ledger = Ledger::new(pool);
    let publisher = GeoServerClient::new(&config.geoserver)?;
    let watcher = IngestWatcher::new(config.inbox, ledger, publisher);

    match watcher.handle_archive(archive).await {
        ArchiveOutcome::Published => {
            println!("{} {}", "Published".green().bold(), archive.display());
            Ok(())
        }
        ArchiveOutcome::PublishFailed => {
            anyhow::bail!("GeoServer rejected the publish; archive was moved to the visited directory")
        }
        ArchiveOutcome::Incomplete => {
            anyhow::bail!("archive is missing required shapefile components")
        }
        ArchiveOutcome::Unreadable => {
            anyhow::bail!("archive is not a readable zip file")
        }
    }
}
