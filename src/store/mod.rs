//! Persistence of per-pair rate series.

pub mod disk;
pub mod file;
pub mod memory;

use crate::core::config::{AppConfig, StorageBackend};
use crate::core::error::StoreError;
use crate::core::pair::CurrencyPair;
use crate::core::series::{RatePoint, TimeSeries};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Storage keyed by pair. `replace` swaps the whole series atomically: a
/// reader sees either the previous series or the new one, never a mix.
#[async_trait]
pub trait SeriesStore: Send + Sync {
    async fn load(&self, pair: &CurrencyPair) -> Result<Option<TimeSeries>, StoreError>;

    async fn replace(&self, series: &TimeSeries) -> Result<(), StoreError>;
}

/// Rebuilds a loaded series, rejecting non-positive or non-finite rates and
/// empty payloads the same way for every backend.
pub(crate) fn series_from_stored(
    pair: &CurrencyPair,
    points: Vec<RatePoint>,
) -> Result<TimeSeries, StoreError> {
    if let Some(bad) = points
        .iter()
        .find(|p| !(p.rate.is_finite() && p.rate > 0.0))
    {
        return Err(StoreError::Corrupt {
            pair: pair.clone(),
            reason: format!("invalid rate {} on {}", bad.rate, bad.date),
        });
    }
    TimeSeries::new(pair.clone(), points).map_err(|_| StoreError::Corrupt {
        pair: pair.clone(),
        reason: "stored series is empty".to_string(),
    })
}

/// Opens the backend selected in the config under its data directory.
pub fn open_store(config: &AppConfig) -> Result<Arc<dyn SeriesStore>> {
    let data_dir = config.data_dir()?;
    debug!(backend = ?config.storage, path = %data_dir.display(), "Opening series store");
    let store: Arc<dyn SeriesStore> = match config.storage {
        StorageBackend::Csv => Arc::new(
            file::CsvSeriesStore::new(data_dir.join("series"))
                .context("Failed to open CSV series store")?,
        ),
        StorageBackend::Fjall => Arc::new(
            disk::FjallSeriesStore::new(&data_dir.join("store"))
                .context("Failed to open key-value series store")?,
        ),
    };
    Ok(store)
}
