//! Error types shared by the fetch, storage, forecast and render layers.

use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

use super::pair::CurrencyPair;

/// Failure to obtain a single day's observation. Always recoverable: the
/// historical cache logs it and skips the day.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("No {pair} rate published for {date}")]
    MissingData { pair: CurrencyPair, date: NaiveDate },

    #[error("HTTP error: {status} for {what}")]
    Status {
        status: reqwest::StatusCode,
        what: String,
    },

    #[error("Request error for {what}: {source}")]
    Transport {
        what: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Malformed provider payload for {what}: {reason}")]
    Malformed { what: String, reason: String },

    #[error("Provider rejected request for {what}: {reason}")]
    Rejected { what: String, reason: String },
}

impl FetchError {
    pub fn is_missing(&self) -> bool {
        matches!(self, FetchError::MissingData { .. })
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Key-value store error: {0}")]
    Fjall(#[from] fjall::Error),

    #[error("Corrupt series for {pair}: {reason}")]
    Corrupt { pair: CurrencyPair, reason: String },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors surfaced by the service operations.
#[derive(Debug, Error)]
pub enum ForexError {
    #[error("Invalid currency pair '{input}': {reason}")]
    InvalidPair { input: String, reason: String },

    #[error("No historical data could be obtained for {pair}")]
    NoData { pair: CurrencyPair },

    #[error("At least {required} historical points are needed to forecast {pair}, found {found}")]
    InsufficientData {
        pair: CurrencyPair,
        required: usize,
        found: usize,
    },

    #[error("Failed to render chart {path}: {reason}")]
    Render { path: PathBuf, reason: String },

    #[error(transparent)]
    Storage(#[from] StoreError),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}
