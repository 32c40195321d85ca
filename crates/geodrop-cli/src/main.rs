//! geodrop - operator CLI entry point

use anyhow::Result;
use clap::Parser;

use geodrop_cli::{commands, Cli, Commands};
use geodrop_common::logging::{init_logging, LogConfig, LogLevel};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Warn
    };
    init_logging(&LogConfig::builder().level(level).build())?;

    let result = match cli.command {
        Commands::InitDb => commands::init_db::execute(&cli.database_url).await,
        Commands::Status { limit, format } => {
            commands::status::execute(&cli.database_url, limit, format).await
        }
        Commands::Publish { archive } => {
            commands::publish::execute(&cli.database_url, &archive).await
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
