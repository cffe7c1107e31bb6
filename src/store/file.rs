use crate::core::error::StoreError;
use crate::core::pair::CurrencyPair;
use crate::core::series::{RatePoint, TimeSeries};
use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{SeriesStore, series_from_stored};

/// One `date,rate` CSV file per pair, ascending by date.
pub struct CsvSeriesStore {
    dir: PathBuf,
}

impl CsvSeriesStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;
        Ok(Self { dir })
    }

    pub fn path_for(&self, pair: &CurrencyPair) -> PathBuf {
        self.dir.join(format!("{}.csv", pair.slug()))
    }

    fn read_series(pair: &CurrencyPair, path: &Path) -> Result<TimeSeries, StoreError> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut points = Vec::new();
        for record in reader.deserialize::<RatePoint>() {
            points.push(record?);
        }
        series_from_stored(pair, points)
    }
}

#[async_trait]
impl SeriesStore for CsvSeriesStore {
    async fn load(&self, pair: &CurrencyPair) -> Result<Option<TimeSeries>, StoreError> {
        let path = self.path_for(pair);
        if !path.exists() {
            debug!("Series MISS for {}", pair);
            return Ok(None);
        }
        let series = Self::read_series(pair, &path)?;
        debug!("Series HIT for {} ({} points)", pair, series.len());
        Ok(Some(series))
    }

    /// Writes to a sibling temp file, then renames it over the old series.
    async fn replace(&self, series: &TimeSeries) -> Result<(), StoreError> {
        let path = self.path_for(series.pair());
        let tmp_path = path.with_extension("csv.tmp");

        let mut writer = csv::Writer::from_path(&tmp_path)?;
        for point in series.points() {
            writer.serialize(point)?;
        }
        writer.flush().map_err(|e| StoreError::io(&tmp_path, e))?;
        writer
            .get_ref()
            .sync_all()
            .map_err(|e| StoreError::io(&tmp_path, e))?;
        drop(writer);

        fs::rename(&tmp_path, &path).map_err(|e| StoreError::io(&path, e))?;
        debug!("Series PUT for {} at {}", series.pair(), path.display());
        Ok(())
    }
}
