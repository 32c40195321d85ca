//! geodrop-ingest - shapefile inbox watcher daemon

use anyhow::{Context, Result};
use geodrop_common::logging::{init_logging, LogConfig};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use geodrop_ingest::config::Config;
use geodrop_ingest::db;
use geodrop_ingest::geoserver::GeoServerClient;
use geodrop_ingest::ledger::Ledger;
use geodrop_ingest::watcher::IngestWatcher;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let log_config = LogConfig::from_env()?;
    init_logging(&log_config)?;

    info!(version = env!("CARGO_PKG_VERSION"), "starting geodrop ingest daemon");

    let config = Config::load()?;
    if !config.inbox.inbox_dir.is_dir() {
        anyhow::bail!(
            "inbox directory {} does not exist",
            config.inbox.inbox_dir.display()
        );
    }
    info!(
        inbox = %config.inbox.inbox_dir.display(),
        visited = %config.inbox.visited_dir.display(),
        geoserver = %config.geoserver.url,
        "configuration loaded"
    );

    let pool = db::create_pool(&config.database).context("invalid database configuration")?;
    match db::run_migrations(&pool).await {
        Ok(()) => info!("ledger schema is up to date"),
        Err(e) => warn!(
            error = %e,
            "could not run ledger migrations; lifecycle records degraded until the database returns"
        ),
    }
    match db::health_check(&pool).await {
        Ok(()) => info!("ledger database reachable"),
        Err(e) => warn!(error = %e, "ledger database unreachable, publishing continues without records"),
    }

    let publisher = GeoServerClient::new(&config.geoserver)?;
    let ledger = Ledger::new(pool);
    let watcher = IngestWatcher::new(config.inbox, ledger, publisher);

    let cancel = CancellationToken::new();
    let mut watcher_task = tokio::spawn(watcher.run(cancel.clone()));

    tokio::select! {
        _ = shutdown_signal() => {
            cancel.cancel();
            (&mut watcher_task).await.context("watcher task aborted")??;
        }
        result = &mut watcher_task => {
            result.context("watcher task aborted")??;
        }
    }

    info!("geodrop ingest daemon stopped");
    Ok(())
}

/// Resolves on SIGINT or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, shutting down"),
        _ = terminate => info!("received terminate signal, shutting down"),
    }
}
