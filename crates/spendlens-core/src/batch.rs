//! Multi-file loading
//!
//! Each file is read and parsed as its own unit of work. Files that cannot be
//! read, fail CSV parsing, or carry an unrecognized header are reported and
//! skipped; the rest of the batch still contributes transactions. The pooled
//! set is only returned once every file has finished, in input order, with
//! exactly one report per input.

use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::error::Result;
use crate::import::{parse_csv, ImportOptions, ParsedFile};
use crate::models::{Schema, Transaction};

/// What happened to one input file
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    Imported {
        schema: Schema,
        imported: usize,
        rejected: usize,
    },
    Skipped {
        reason: String,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub source: String,
    pub outcome: FileOutcome,
}

/// Pooled transactions from every successfully parsed file
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchResult {
    pub transactions: Vec<Transaction>,
    pub files: Vec<FileReport>,
}

impl BatchResult {
    pub fn imported_files(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f.outcome, FileOutcome::Imported { .. }))
            .count()
    }

    pub fn skipped_files(&self) -> usize {
        self.files.len() - self.imported_files()
    }

    pub fn rejected_rows(&self) -> usize {
        self.files
            .iter()
            .map(|f| match f.outcome {
                FileOutcome::Imported { rejected, .. } => rejected,
                FileOutcome::Skipped { .. } => 0,
            })
            .sum()
    }

    fn push(&mut self, source: String, parsed: Result<ParsedFile>) {
        let outcome = match parsed {
            Ok(parsed) if parsed.schema == Schema::Unknown => {
                warn!("Skipping {}: unrecognized bank format", source);
                FileOutcome::Skipped {
                    reason: "unrecognized bank format".to_string(),
                }
            }
            Ok(parsed) => {
                info!(
                    "Loaded {} {} transactions from {} ({} rejected)",
                    parsed.transactions.len(),
                    parsed.schema,
                    source,
                    parsed.rejected
                );
                let outcome = FileOutcome::Imported {
                    schema: parsed.schema,
                    imported: parsed.transactions.len(),
                    rejected: parsed.rejected,
                };
                self.transactions.extend(parsed.transactions);
                outcome
            }
            Err(e) => {
                warn!("Skipping {}: {}", source, e);
                FileOutcome::Skipped {
                    reason: e.to_string(),
                }
            }
        };

        self.files.push(FileReport { source, outcome });
    }
}

/// Load and pool several CSV files
///
/// Files are parsed concurrently; reports and transactions keep input order.
pub async fn load_files<P: AsRef<Path>>(paths: &[P], options: &ImportOptions) -> BatchResult {
    let tasks: Vec<(String, JoinHandle<Result<ParsedFile>>)> = paths
        .iter()
        .map(|path| {
            let path: PathBuf = path.as_ref().to_path_buf();
            let source = path.display().to_string();
            let options = *options;
            let handle = tokio::spawn(async move {
                match tokio::fs::read(&path).await {
                    Ok(bytes) => parse_csv(bytes.as_slice(), &options),
                    Err(e) => Err(e.into()),
                }
            });
            (source, handle)
        })
        .collect();

    collect(tasks).await
}

/// Await every task in order; a task that panicked is reported as skipped
async fn collect(tasks: Vec<(String, JoinHandle<Result<ParsedFile>>)>) -> BatchResult {
    let mut batch = BatchResult::default();
    for (source, handle) in tasks {
        match handle.await {
            Ok(parsed) => batch.push(source, parsed),
            Err(e) => {
                warn!("File task failed for {}: {}", source, e);
                batch.files.push(FileReport {
                    source,
                    outcome: FileOutcome::Skipped {
                        reason: format!("file task failed: {}", e),
                    },
                });
            }
        }
    }
    batch
}

/// Load and pool in-memory sources, labelled for reporting
pub fn load_readers<R, I>(sources: I, options: &ImportOptions) -> BatchResult
where
    R: Read,
    I: IntoIterator<Item = (String, R)>,
{
    let mut batch = BatchResult::default();
    for (source, reader) in sources {
        batch.push(source, parse_csv(reader, options));
    }
    batch
}
