//! Ingestion coordinator
//!
//! Single loop that owns the whole life of an archive: detection, ledger
//! record, extraction, validation, publish, completion record, relocation.
//! Each stage failure is classified and logged here; none of them stops
//! the scan loop.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tokio::task;
use tokio::time::{self, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::archive;
use crate::config::InboxConfig;
use crate::geoserver::GeoServerClient;
use crate::inbox::InboxScanner;
use crate::ledger::{Ledger, SeenOutcome};
use crate::shapefile;

/// How handling of one archive ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveOutcome {
    /// Published, recorded and moved to the visited directory.
    Published,
    /// GeoServer rejected a step; archive moved out, ledger row stays `added`.
    PublishFailed,
    /// Required shapefile companions missing; archive left in the inbox.
    Incomplete,
    /// Not a readable zip archive; left in the inbox.
    Unreadable,
}

pub struct IngestWatcher {
    config: InboxConfig,
    ledger: Ledger,
    publisher: GeoServerClient,
}

impl IngestWatcher {
    pub fn new(config: InboxConfig, ledger: Ledger, publisher: GeoServerClient) -> Self {
        Self {
            config,
            ledger,
            publisher,
        }
    }

    /// Scan loop. Runs until the token is cancelled; every fired archive
    /// is handled to completion before the next scan starts.
    pub async fn run(self, cancel: CancellationToken) -> anyhow::Result<()> {
        let mut scanner = InboxScanner::new(&self.config.inbox_dir);
        let preexisting = scanner.baseline().with_context(|| {
            format!(
                "could not read inbox directory {}",
                self.config.inbox_dir.display()
            )
        })?;
        if preexisting > 0 {
            info!(
                count = preexisting,
                "archives already in the inbox are ignored; resubmit them to publish"
            );
        }
        info!(
            inbox = %self.config.inbox_dir.display(),
            interval_secs = self.config.scan_interval_secs,
            "watching for archive uploads"
        );

        let mut ticker = time::interval(Duration::from_secs(self.config.scan_interval_secs));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("shutdown requested, stopping inbox scan");
                    return Ok(());
                }
                _ = ticker.tick() => {
                    let batch = match scanner.poll() {
                        Ok(batch) => batch,
                        Err(e) => {
                            warn!(error = %e, "inbox scan failed, retrying next interval");
                            continue;
                        }
                    };
                    for archive_path in batch {
                        if cancel.is_cancelled() {
                            info!("shutdown requested, stopping before the rest of the batch");
                            return Ok(());
                        }
                        let outcome = self.handle_archive(&archive_path).await;
                        info!(
                            file = %archive_path.display(),
                            outcome = ?outcome,
                            "archive handling finished"
                        );
                    }
                }
            }
        }
    }

    /// Drive one archive through the stage pipeline.
    ///
    /// The ledger sighting is recorded before any validation so even a
    /// corrupt upload leaves an audit row. A ledger outage downgrades the
    /// lifecycle records but never blocks publishing.
    pub async fn handle_archive(&self, archive_path: &Path) -> ArchiveOutcome {
        let file_name = match archive_path.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => {
                warn!(path = %archive_path.display(), "archive path has no file name, skipping");
                return ArchiveOutcome::Unreadable;
            }
        };

        info!(file = %file_name, "new archive detected");

        match self.ledger.record_seen(&file_name).await {
            Ok(SeenOutcome::Added) => {
                info!(file = %file_name, "recorded in ledger with status added");
            }
            Ok(SeenOutcome::Resubmitted) => {
                info!(file = %file_name, "resubmission of a known file, ledger row re-flagged");
            }
            Err(e) => {
                warn!(file = %file_name, error = %e, "ledger unavailable, continuing without a lifecycle record");
            }
        }

        let extraction = {
            let path = archive_path.to_path_buf();
            task::spawn_blocking(move || archive::extract_archive(&path)).await
        };
        let members = match extraction {
            Ok(Ok(members)) => members,
            Ok(Err(e)) => {
                error!(file = %file_name, error = %e, "archive is not extractable, leaving it in the inbox");
                return ArchiveOutcome::Unreadable;
            }
            Err(e) => {
                error!(file = %file_name, error = %e, "extraction task failed");
                return ArchiveOutcome::Unreadable;
            }
        };

        let base_name = match shapefile::discover_base_name(&members) {
            Some(base) => base,
            None => {
                warn!(file = %file_name, "archive has no .shp member, nothing to publish");
                return ArchiveOutcome::Incomplete;
            }
        };

        let inbox_dir = match archive_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        match shapefile::missing_components(inbox_dir, &base_name) {
            Ok(missing) if missing.is_empty() => {
                info!(file = %file_name, base = %base_name, "all required components present, publishing");
            }
            Ok(missing) => {
                warn!(
                    file = %file_name,
                    base = %base_name,
                    missing = ?missing,
                    "required shapefile components missing, not publishing"
                );
                return ArchiveOutcome::Incomplete;
            }
            Err(e) => {
                error!(file = %file_name, error = %e, "could not inspect extracted components");
                return ArchiveOutcome::Incomplete;
            }
        }

        let layer_name = archive_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_name.clone());

        let outcome = match self.publisher.publish_layer(archive_path, &layer_name).await {
            Ok(()) => {
                match self.ledger.mark_processed(&file_name).await {
                    Ok(0) => warn!(file = %file_name, "no ledger row to mark processed"),
                    Ok(_) => info!(file = %file_name, "ledger status set to processed"),
                    Err(e) => {
                        warn!(file = %file_name, error = %e, "ledger unavailable, processed status not recorded");
                    }
                }
                ArchiveOutcome::Published
            }
            Err(e) => {
                error!(
                    file = %file_name,
                    layer = %layer_name,
                    error = %e,
                    "publish failed, resubmit the archive to retry"
                );
                ArchiveOutcome::PublishFailed
            }
        };

        // The archive leaves the inbox whenever a publish was attempted,
        // success or not; only malformed uploads stay behind.
        match self.relocate(archive_path, &file_name).await {
            Ok(destination) => {
                info!(file = %file_name, to = %destination.display(), "archive moved to visited directory");
            }
            Err(e) => {
                error!(file = %file_name, error = %e, "could not move archive to visited directory");
            }
        }

        outcome
    }

    async fn relocate(&self, archive_path: &Path, file_name: &str) -> std::io::Result<PathBuf> {
        tokio::fs::create_dir_all(&self.config.visited_dir).await?;
        let destination = self.config.visited_dir.join(file_name);
        match tokio::fs::rename(archive_path, &destination).await {
            Ok(()) => Ok(destination),
            Err(_) => {
                // Rename fails across filesystems; fall back to copy + remove.
                tokio::fs::copy(archive_path, &destination).await?;
                tokio::fs::remove_file(archive_path).await?;
                Ok(destination)
            }
        }
    }
}
