//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `geo_searcher` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use geo_searcher::initialization::init_logger_with;
use geo_searcher::{run_ingestion, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file (if it exists), so KAFKA_HOST and
    // friends do not need to be exported manually
    let _ = dotenvy::dotenv();

    // Parse command-line arguments into Config
    let config = Config::parse();

    // Initialize logger based on config
    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    // Run the pipeline using the library
    match run_ingestion(config).await {
        Ok(report) => {
            println!(
                "✅ Received {} message{} ({} stored, {} skipped) in {:.1}s",
                report.received,
                if report.received == 1 { "" } else { "s" },
                report.stored,
                report.skipped,
                report.elapsed_seconds
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("geo_searcher error: {:#}", e);
            process::exit(1);
        }
    }
}
