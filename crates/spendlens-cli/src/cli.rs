//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// SpendLens - Spending dashboards from bank CSV exports
#[derive(Parser)]
#[command(name = "spendlens")]
#[command(about = "Spending analytics for Amex, Chase and Capital One exports", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings file (defaults to ~/.config/spendlens/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// CSV inputs shared by the loading commands
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// CSV files to load (pooled into one transaction set)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Bank format: amex, chase, capitalone, generic (auto-detected if not specified)
    #[arg(short, long)]
    pub bank: Option<String>,

    /// Files have no header row (date, description, amount, optional category)
    #[arg(long)]
    pub headerless: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the spending dashboard for one or more CSV files
    Summary {
        #[command(flatten)]
        input: InputArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Categories shown before collapsing into "Other"
        #[arg(long)]
        top: Option<usize>,

        /// Ask the local Ollama server for commentary (requires OLLAMA_HOST)
        #[arg(long)]
        insights: bool,
    },

    /// Show the detected bank format of each file
    Detect {
        /// CSV files to inspect
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// List the normalized transactions
    Transactions {
        #[command(flatten)]
        input: InputArgs,

        /// Number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the running balance over time
    Balance {
        #[command(flatten)]
        input: InputArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
