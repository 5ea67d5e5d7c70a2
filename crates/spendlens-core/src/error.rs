//! Error types for SpendLens

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Import error: {0}")]
    Import(String),

    #[error("Unsupported bank format: {0}")]
    UnsupportedBank(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Insight service error: {0}")]
    Insight(String),
}

pub type Result<T> = std::result::Result<T, Error>;
