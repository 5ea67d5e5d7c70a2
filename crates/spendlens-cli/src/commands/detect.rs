//! Format detection command

use std::path::PathBuf;

use anyhow::Result;
use spendlens_core::{load_files, FileOutcome, ImportOptions};

pub async fn cmd_detect(files: &[PathBuf]) -> Result<()> {
    let batch = load_files(files, &ImportOptions::default()).await;

    println!();
    println!("🔍 Detected Formats");
    println!("   ─────────────────────────────────────────────────────────────");

    for file in &batch.files {
        match &file.outcome {
            FileOutcome::Imported {
                schema,
                imported,
                rejected,
            } => {
                let rejected_note = if *rejected > 0 {
                    format!(", {} rejected", rejected)
                } else {
                    String::new()
                };
                println!(
                    "   ✅ {} → {} ({} rows{})",
                    file.source,
                    schema.label(),
                    imported,
                    rejected_note
                );
            }
            FileOutcome::Skipped { reason } => {
                println!("   ❌ {} → {}", file.source, reason);
            }
        }
    }

    if batch.skipped_files() > 0 {
        println!();
        println!("   Supported formats: amex, chase, capitalone, or headerless");
        println!("   (date, description, amount). Use --bank to force one.");
    }

    Ok(())
}
