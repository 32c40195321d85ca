//! Geodrop Ingestion Library
//!
//! Watches an inbox directory for zipped shapefile archives and publishes
//! them to a GeoServer instance.
//!
//! # Overview
//!
//! The ingestion daemon is a single coordinator loop built from these parts:
//!
//! - **Inbox scanning**: polling detector that fires once per delivered archive
//! - **Lifecycle ledger**: PostgreSQL `filetable` rows tracking each upload
//! - **Archive handling**: zip extraction and shapefile completeness checks
//! - **Publishing**: idempotent GeoServer REST calls (layer, datastore, feature type)
//!
//! # Pipeline
//!
//! Every detected archive runs through the same stage order:
//!
//! 1. Record the sighting in the ledger (`added`, or re-flag a resubmission)
//! 2. Extract the zip next to the archive
//! 3. Find the shapefile base name and check the required companions
//! 4. Publish the layer to GeoServer
//! 5. Mark the ledger row `processed` (publish success only)
//! 6. Move the archive to the visited directory
//!
//! Failures are classified and logged inside the coordinator; the scan loop
//! itself never dies because one archive was bad or a backend was down.
//!
//! # Example
//!
//! ```no_run
//! use geodrop_ingest::config::Config;
//! use geodrop_ingest::geoserver::GeoServerClient;
//! use geodrop_ingest::ledger::Ledger;
//! use geodrop_ingest::watcher::IngestWatcher;
//! use geodrop_ingest::db;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let pool = db::create_pool(&config.database)?;
//!     let publisher = GeoServerClient::new(&config.geoserver)?;
//!     let watcher = IngestWatcher::new(config.inbox, Ledger::new(pool), publisher);
//!     watcher.run(CancellationToken::new()).await
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod archive;
pub mod config;
pub mod db;
pub mod geoserver;
pub mod inbox;
pub mod ledger;
pub mod shapefile;
pub mod watcher;

// Re-export commonly used types
pub use config::Config;
pub use geoserver::{GeoServerClient, PublishError};
pub use ledger::{FileRecord, FileStatus, Ledger, SeenOutcome};
pub use watcher::{ArchiveOutcome, IngestWatcher};
