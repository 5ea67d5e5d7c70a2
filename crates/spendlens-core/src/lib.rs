//! SpendLens Core Library
//!
//! Shared functionality for the SpendLens spending analyzer:
//! - CSV format detection for Amex, Chase and Capital One exports
//! - Row normalization into canonical transactions
//! - Concurrent multi-file loading
//! - Spending aggregation (totals, categories, trends, recurring charges)
//! - Layered settings with embedded defaults
//! - Optional narrative insights from a local Ollama server

pub mod aggregate;
pub mod batch;
pub mod config;
pub mod error;
pub mod import;
pub mod insights;
pub mod models;

pub use aggregate::{aggregate, aggregate_with, AggregateConfig};
pub use batch::{load_files, load_readers, BatchResult, FileOutcome, FileReport};
pub use config::{InsightSettings, Settings};
pub use error::{Error, Result};
pub use import::{detect_schema, normalize_row, parse_csv, ImportOptions, ParsedFile, RawRow};
pub use insights::{request_insights, InsightBackend, MockInsights, OllamaInsights};
pub use models::{AggregateResult, Schema, Transaction};
