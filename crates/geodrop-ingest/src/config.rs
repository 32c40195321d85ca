//! Configuration management
//!
//! All settings come from environment variables (a `.env` file is honored
//! when present) with defaults suitable for a local GeoServer + Postgres
//! setup. `Config::load` reads the environment once at startup; nothing
//! re-reads variables afterwards.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Inbox Defaults
// ============================================================================

pub const DEFAULT_INBOX_DIR: &str = "./uploads";
pub const DEFAULT_VISITED_DIR: &str = "./visited";
pub const DEFAULT_SCAN_INTERVAL_SECS: u64 = 2;

// ============================================================================
// GeoServer Defaults
// ============================================================================

pub const DEFAULT_GEOSERVER_URL: &str = "http://localhost:8080/geoserver/rest";
pub const DEFAULT_GEOSERVER_WORKSPACE: &str = "pvlayer";
pub const DEFAULT_GEOSERVER_DATASTORE: &str = "pvlayer";
pub const DEFAULT_GEOSERVER_USERNAME: &str = "admin";
pub const DEFAULT_GEOSERVER_PASSWORD: &str = "geoserver";
pub const DEFAULT_GEOSERVER_SRS: &str = "EPSG:4326";
pub const DEFAULT_GEOSERVER_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Database Defaults
// ============================================================================

pub const DEFAULT_DATABASE_URL: &str = "postgresql://localhost/geodrop";
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_DATABASE_ACQUIRE_TIMEOUT_SECS: u64 = 5;

/// Top-level daemon configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub inbox: InboxConfig,
    pub geoserver: GeoServerConfig,
    pub database: DatabaseConfig,
}

/// Where archives arrive and where they go once handled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboxConfig {
    pub inbox_dir: PathBuf,
    pub visited_dir: PathBuf,
    pub scan_interval_secs: u64,
}

/// GeoServer REST endpoint and the fixed publishing target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoServerConfig {
    /// Base REST URL, e.g. `http://localhost:8080/geoserver/rest`.
    pub url: String,
    pub workspace: String,
    pub datastore: String,
    pub username: String,
    pub password: String,
    /// Spatial reference system assigned to registered feature types.
    pub srs: String,
    pub timeout_secs: u64,
}

/// Ledger database connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        let config = Config {
            inbox: InboxConfig {
                inbox_dir: PathBuf::from(
                    std::env::var("GEODROP_INBOX_DIR")
                        .unwrap_or_else(|_| DEFAULT_INBOX_DIR.to_string()),
                ),
                visited_dir: PathBuf::from(
                    std::env::var("GEODROP_VISITED_DIR")
                        .unwrap_or_else(|_| DEFAULT_VISITED_DIR.to_string()),
                ),
                scan_interval_secs: std::env::var("GEODROP_SCAN_INTERVAL")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_SCAN_INTERVAL_SECS),
            },
            geoserver: GeoServerConfig {
                url: std::env::var("GEOSERVER_URL")
                    .unwrap_or_else(|_| DEFAULT_GEOSERVER_URL.to_string()),
                workspace: std::env::var("GEOSERVER_WORKSPACE")
                    .unwrap_or_else(|_| DEFAULT_GEOSERVER_WORKSPACE.to_string()),
                datastore: std::env::var("GEOSERVER_DATASTORE")
                    .unwrap_or_else(|_| DEFAULT_GEOSERVER_DATASTORE.to_string()),
                username: std::env::var("GEOSERVER_USERNAME")
                    .unwrap_or_else(|_| DEFAULT_GEOSERVER_USERNAME.to_string()),
                password: std::env::var("GEOSERVER_PASSWORD")
                    .unwrap_or_else(|_| DEFAULT_GEOSERVER_PASSWORD.to_string()),
                srs: std::env::var("GEOSERVER_SRS")
                    .unwrap_or_else(|_| DEFAULT_GEOSERVER_SRS.to_string()),
                timeout_secs: std::env::var("GEOSERVER_TIMEOUT")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_GEOSERVER_TIMEOUT_SECS),
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
                max_connections: std::env::var("GEODROP_DB_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_DATABASE_MAX_CONNECTIONS),
                acquire_timeout_secs: std::env::var("GEODROP_DB_ACQUIRE_TIMEOUT")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_DATABASE_ACQUIRE_TIMEOUT_SECS),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.inbox.scan_interval_secs == 0 {
            anyhow::bail!("Scan interval must be greater than 0");
        }

        if self.inbox.inbox_dir == self.inbox.visited_dir {
            anyhow::bail!("Inbox and visited directories must differ");
        }

        if self.geoserver.url.is_empty() {
            anyhow::bail!("GeoServer URL cannot be empty");
        }

        if self.geoserver.workspace.is_empty() || self.geoserver.datastore.is_empty() {
            anyhow::bail!("GeoServer workspace and datastore cannot be empty");
        }

        if self.geoserver.username.is_empty() || self.geoserver.password.is_empty() {
            anyhow::bail!("GeoServer credentials cannot be empty");
        }

        if self.geoserver.timeout_secs == 0 {
            anyhow::bail!("GeoServer timeout must be greater than 0");
        }

        if self.database.url.is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }

        if self.database.max_connections == 0 {
            anyhow::bail!("Database max connections must be greater than 0");
        }

        if self.database.acquire_timeout_secs == 0 {
            anyhow::bail!("Database acquire timeout must be greater than 0");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            inbox: InboxConfig {
                inbox_dir: PathBuf::from(DEFAULT_INBOX_DIR),
                visited_dir: PathBuf::from(DEFAULT_VISITED_DIR),
                scan_interval_secs: DEFAULT_SCAN_INTERVAL_SECS,
            },
            geoserver: GeoServerConfig {
                url: DEFAULT_GEOSERVER_URL.to_string(),
                workspace: DEFAULT_GEOSERVER_WORKSPACE.to_string(),
                datastore: DEFAULT_GEOSERVER_DATASTORE.to_string(),
                username: DEFAULT_GEOSERVER_USERNAME.to_string(),
                password: DEFAULT_GEOSERVER_PASSWORD.to_string(),
                srs: DEFAULT_GEOSERVER_SRS.to_string(),
                timeout_secs: DEFAULT_GEOSERVER_TIMEOUT_SECS,
            },
            database: DatabaseConfig {
                url: DEFAULT_DATABASE_URL.to_string(),
                max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
                acquire_timeout_secs: DEFAULT_DATABASE_ACQUIRE_TIMEOUT_SECS,
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serial_test::serial;

    const ENV_VARS: &[&str] = &[
        "GEODROP_INBOX_DIR",
        "GEODROP_VISITED_DIR",
        "GEODROP_SCAN_INTERVAL",
        "GEOSERVER_URL",
        "GEOSERVER_WORKSPACE",
        "GEOSERVER_DATASTORE",
        "GEOSERVER_USERNAME",
        "GEOSERVER_PASSWORD",
        "GEOSERVER_SRS",
        "GEOSERVER_TIMEOUT",
        "DATABASE_URL",
        "GEODROP_DB_MAX_CONNECTIONS",
        "GEODROP_DB_ACQUIRE_TIMEOUT",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.geoserver.workspace, "pvlayer");
        assert_eq!(config.geoserver.datastore, "pvlayer");
        assert_eq!(config.geoserver.srs, "EPSG:4326");
    }

    #[test]
    #[serial]
    fn test_load_uses_defaults_when_env_unset() {
        clear_env();

        let config = Config::load().unwrap();
        assert_eq!(config.inbox.inbox_dir, PathBuf::from("./uploads"));
        assert_eq!(config.inbox.visited_dir, PathBuf::from("./visited"));
        assert_eq!(config.inbox.scan_interval_secs, 2);
        assert_eq!(config.geoserver.url, "http://localhost:8080/geoserver/rest");
        assert_eq!(config.database.max_connections, 5);
    }

    #[test]
    #[serial]
    fn test_load_reads_environment() {
        clear_env();
        std::env::set_var("GEODROP_INBOX_DIR", "/srv/uploads");
        std::env::set_var("GEODROP_SCAN_INTERVAL", "7");
        std::env::set_var("GEOSERVER_WORKSPACE", "parcels");
        std::env::set_var("GEODROP_DB_MAX_CONNECTIONS", "12");

        let config = Config::load().unwrap();
        assert_eq!(config.inbox.inbox_dir, PathBuf::from("/srv/uploads"));
        assert_eq!(config.inbox.scan_interval_secs, 7);
        assert_eq!(config.geoserver.workspace, "parcels");
        assert_eq!(config.database.max_connections, 12);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_load_ignores_unparsable_numbers() {
        clear_env();
        std::env::set_var("GEODROP_SCAN_INTERVAL", "soon");
        std::env::set_var("GEOSERVER_TIMEOUT", "-1");

        let config = Config::load().unwrap();
        assert_eq!(config.inbox.scan_interval_secs, DEFAULT_SCAN_INTERVAL_SECS);
        assert_eq!(config.geoserver.timeout_secs, DEFAULT_GEOSERVER_TIMEOUT_SECS);

        clear_env();
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let mut config = Config::default();
        config.inbox.scan_interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_shared_directories() {
        let mut config = Config::default();
        config.inbox.visited_dir = config.inbox.inbox_dir.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_credentials() {
        let mut config = Config::default();
        config.geoserver.password = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_acquire_timeout() {
        let mut config = Config::default();
        config.database.acquire_timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
