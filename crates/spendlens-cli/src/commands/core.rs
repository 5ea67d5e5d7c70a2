//! Shared command utilities
//!
//! This module contains:
//! - `import_options` - Build import options from CLI flags
//! - `load_batch` - Load and pool CSV files
//! - `format_amount` / `format_change` - Colored terminal values

use anyhow::{anyhow, Result};
use spendlens_core::{load_files, BatchResult, ImportOptions, Schema};
use tracing::debug;

use crate::cli::InputArgs;

/// Resolve `--bank` and `--headerless` into import options
pub fn import_options(bank: Option<&str>, headerless: bool) -> Result<ImportOptions> {
    let schema = bank
        .map(|b| b.parse::<Schema>().map_err(|e| anyhow!(e)))
        .transpose()?;

    Ok(ImportOptions { schema, headerless })
}

/// Load and pool every input file; skipped files are logged by the loader
pub async fn load_batch(input: &InputArgs) -> Result<BatchResult> {
    let options = import_options(input.bank.as_deref(), input.headerless)?;
    let batch = load_files(&input.files, &options).await;
    debug!(
        "Pooled {} transactions from {} of {} files",
        batch.transactions.len(),
        batch.imported_files(),
        batch.files.len()
    );

    Ok(batch)
}

/// Color a signed amount: red for spending, green for income
pub fn format_amount(amount: f64) -> String {
    if amount < 0.0 {
        format!("\x1b[31m${:.2}\x1b[0m", amount.abs())
    } else {
        format!("\x1b[32m+${:.2}\x1b[0m", amount)
    }
}

/// Color a percent change: red when spending went up
pub fn format_change(change: f64) -> String {
    if change > 0.0 {
        format!("\x1b[31m▲ {:.1}%\x1b[0m", change)
    } else if change < 0.0 {
        format!("\x1b[32m▼ {:.1}%\x1b[0m", change.abs())
    } else {
        "0.0%".to_string()
    }
}
