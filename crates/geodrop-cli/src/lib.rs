//! Geodrop CLI Library
//!
//! Command definitions for `geodrop`, the operator companion to the
//! ingestion daemon. The daemon does the watching; this tool covers the
//! one-off jobs around it: preparing the ledger schema, inspecting what
//! has been uploaded, and pushing a single archive through the pipeline
//! by hand.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use geodrop_ingest::config::DEFAULT_DATABASE_URL;

#[derive(Parser)]
#[command(
    name = "geodrop",
    version,
    about = "Operator tool for the geodrop shapefile ingestion pipeline",
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Ledger database connection string
    #[arg(long, env = "DATABASE_URL", global = true, default_value = DEFAULT_DATABASE_URL)]
    pub database_url: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create or update the ledger schema
    InitDb,

    /// Show recorded uploads and their lifecycle status
    Status {
        /// Maximum number of rows to show
        #[arg(short, long, default_value_t = 50)]
        limit: i64,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Run one archive through the full ingestion pipeline
    ///
    /// Exactly what the daemon does for a detected upload: ledger record,
    /// extraction, validation, publish, relocation to the visited
    /// directory. GeoServer settings come from the environment.
    Publish {
        /// Path to the zip archive
        archive: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
