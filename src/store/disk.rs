use crate::core::error::StoreError;
use crate::core::pair::CurrencyPair;
use crate::core::series::{RatePoint, TimeSeries};
use async_trait::async_trait;
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tracing::debug;

use super::{SeriesStore, series_from_stored};

const SERIES_PARTITION: &str = "series";

/// Series kept in an embedded fjall keyspace, one key per pair holding the
/// JSON-encoded points. A single insert replaces the whole series.
pub struct FjallSeriesStore {
    keyspace: Keyspace,
    series: PartitionHandle,
}

impl FjallSeriesStore {
    pub fn new(db_path: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(db_path).map_err(|e| StoreError::io(db_path, e))?;

        let keyspace = Config::new(db_path).open()?;
        let series = keyspace.open_partition(SERIES_PARTITION, PartitionCreateOptions::default())?;
        Ok(Self { keyspace, series })
    }

    fn key(pair: &CurrencyPair) -> String {
        pair.to_string()
    }
}

#[async_trait]
impl SeriesStore for FjallSeriesStore {
    async fn load(&self, pair: &CurrencyPair) -> Result<Option<TimeSeries>, StoreError> {
        let Some(value) = self.series.get(Self::key(pair).as_bytes())? else {
            debug!("Series MISS for key: {}", pair);
            return Ok(None);
        };
        let points: Vec<RatePoint> = serde_json::from_slice(&value)?;
        let series = series_from_stored(pair, points)?;
        debug!("Series HIT for key: {}", pair);
        Ok(Some(series))
    }

    async fn replace(&self, series: &TimeSeries) -> Result<(), StoreError> {
        let value = serde_json::to_vec(series.points())?;
        self.series.insert(Self::key(series.pair()).as_bytes(), value)?;
        self.keyspace.persist(PersistMode::SyncAll)?;
        debug!("Series PUT for key: {}", series.pair());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn sample(pair: &CurrencyPair, rates: &[f64]) -> TimeSeries {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let points = rates
            .iter()
            .enumerate()
            .map(|(i, rate)| RatePoint::new(start + chrono::Duration::days(i as i64), *rate));
        TimeSeries::new(pair.clone(), points).unwrap()
    }

    #[tokio::test]
    async fn test_fjall_store_replace_and_load() {
        let dir = tempdir().unwrap();
        let store = FjallSeriesStore::new(dir.path()).unwrap();
        let pair = CurrencyPair::new("USD", "MXN").unwrap();

        // Initially, store is empty
        assert!(store.load(&pair).await.unwrap().is_none());

        let series = sample(&pair, &[17.1, 17.2, 17.05]);
        store.replace(&series).await.unwrap();
        assert_eq!(store.load(&pair).await.unwrap(), Some(series));

        let shorter = sample(&pair, &[18.0]);
        store.replace(&shorter).await.unwrap();
        assert_eq!(store.load(&pair).await.unwrap(), Some(shorter));
    }

    #[tokio::test]
    async fn test_fjall_store_survives_reopen() {
        let dir = tempdir().unwrap();
        let pair = CurrencyPair::new("CHF", "EUR").unwrap();
        let series = sample(&pair, &[1.02, 1.03]);

        {
            let store = FjallSeriesStore::new(dir.path()).unwrap();
            store.replace(&series).await.unwrap();
        }

        let store = FjallSeriesStore::new(dir.path()).unwrap();
        assert_eq!(store.load(&pair).await.unwrap(), Some(series));
    }

    #[tokio::test]
    async fn test_fjall_store_rejects_bad_rates() {
        let dir = tempdir().unwrap();
        let store = FjallSeriesStore::new(dir.path()).unwrap();
        let pair = CurrencyPair::new("USD", "JPY").unwrap();

        store
            .series
            .insert(
                FjallSeriesStore::key(&pair).as_bytes(),
                br#"[{"date":"2023-01-31","rate":-1.0}]"#.to_vec(),
            )
            .unwrap();
        assert!(matches!(
            store.load(&pair).await,
            Err(StoreError::Corrupt { .. })
        ));

        store
            .series
            .insert(FjallSeriesStore::key(&pair).as_bytes(), b"[]".to_vec())
            .unwrap();
        assert!(matches!(
            store.load(&pair).await,
            Err(StoreError::Corrupt { .. })
        ));
    }
}
