use crate::core::error::StoreError;
use crate::core::pair::CurrencyPair;
use crate::core::series::TimeSeries;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use super::SeriesStore;

/// In-memory series store, used for tests and throwaway sessions
#[derive(Clone, Default)]
pub struct MemorySeriesStore {
    inner: Arc<Mutex<HashMap<CurrencyPair, TimeSeries>>>,
}

impl MemorySeriesStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SeriesStore for MemorySeriesStore {
    async fn load(&self, pair: &CurrencyPair) -> Result<Option<TimeSeries>, StoreError> {
        let series = self.inner.lock().await.get(pair).cloned();
        if series.is_some() {
            debug!("Series HIT for {}", pair);
        } else {
            debug!("Series MISS for {}", pair);
        }
        Ok(series)
    }

    async fn replace(&self, series: &TimeSeries) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        debug!("Series PUT for {}", series.pair());
        inner.insert(series.pair().clone(), series.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::series::RatePoint;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_memory_store_replace_and_load() {
        let store = MemorySeriesStore::new();
        let pair = CurrencyPair::new("USD", "EUR").unwrap();
        let other = CurrencyPair::new("USD", "JPY").unwrap();

        // Initially, store is empty
        assert!(store.load(&pair).await.unwrap().is_none());

        let date = NaiveDate::from_ymd_opt(2023, 1, 30).unwrap();
        let series = TimeSeries::new(pair.clone(), vec![RatePoint::new(date, 0.92)]).unwrap();
        store.replace(&series).await.unwrap();

        assert_eq!(store.load(&pair).await.unwrap(), Some(series));
        assert!(store.load(&other).await.unwrap().is_none());
    }
}
