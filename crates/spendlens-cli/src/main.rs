//! SpendLens CLI - Spending dashboards from bank CSV exports
//!
//! Usage:
//!   spendlens summary amex.csv chase.csv   Spending dashboard for the pooled files
//!   spendlens detect *.csv                 Show the detected bank format per file
//!   spendlens transactions chase.csv       List normalized transactions
//!   spendlens balance chase.csv            Running balance over time

mod cli;
mod commands;


use anyhow::{Context, Result};
use clap::Parser;
use spendlens_core::Settings;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    // Logs go to stderr so --json output stays parseable
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();

    let settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;

    match cli.command {
        Commands::Summary {
            input,
            json,
            top,
            insights,
        } => commands::cmd_summary(&settings, &input, json, top, insights).await,
        Commands::Detect { files } => commands::cmd_detect(&files).await,
        Commands::Transactions { input, limit, json } => {
            commands::cmd_transactions(&input, limit, json).await
        }
        Commands::Balance { input, json } => commands::cmd_balance(&input, json).await,
    }
}
