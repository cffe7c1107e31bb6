//! Materializes and persists the trailing window of daily rates for a pair.

use chrono::Duration;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::config::ReferenceDate;
use super::error::ForexError;
use super::pair::CurrencyPair;
use super::rates::RateFetcher;
use super::series::{RatePoint, TimeSeries};
use crate::store::SeriesStore;

/// Longest lookback window, in days; larger requests are capped.
pub const MAX_LOOKBACK_DAYS: u32 = 365;

pub struct HistoricalCache {
    fetcher: Arc<dyn RateFetcher>,
    store: Arc<dyn SeriesStore>,
    reference: ReferenceDate,
    concurrency: usize,
}

impl HistoricalCache {
    pub fn new(
        fetcher: Arc<dyn RateFetcher>,
        store: Arc<dyn SeriesStore>,
        reference: ReferenceDate,
        concurrency: usize,
    ) -> Self {
        Self {
            fetcher,
            store,
            reference,
            concurrency: concurrency.max(1),
        }
    }

    /// Fetches every day in `(reference - lookback_days, reference]` (the
    /// window is capped at [`MAX_LOOKBACK_DAYS`]), replaces the stored series
    /// for `pair` with whatever was obtained and returns it.
    ///
    /// Days the provider cannot answer are skipped. Fails with `NoData` only
    /// when no day at all produced a rate; the stored series is left intact
    /// in that case.
    #[instrument(name = "HistoricalEnsure", skip(self), fields(pair = %pair))]
    pub async fn ensure(
        &self,
        pair: &CurrencyPair,
        lookback_days: u32,
    ) -> Result<TimeSeries, ForexError> {
        let days = lookback_days.min(MAX_LOOKBACK_DAYS);
        if days < lookback_days {
            debug!(requested = lookback_days, days, "Lookback window capped");
        }
        let end = self.reference.resolve();
        info!(%end, days, "Fetching historical rates");

        let fetcher = &self.fetcher;
        let points: Vec<RatePoint> = stream::iter(0..days)
            .map(|offset| {
                let date = end - Duration::days(i64::from(offset));
                async move {
                    match fetcher.fetch(pair, date).await {
                        Ok(point) => Some(point),
                        Err(e) if e.is_missing() => {
                            debug!(%date, "No rate for day, skipping");
                            None
                        }
                        Err(e) => {
                            warn!(%date, error = %e, "Failed to fetch rate, skipping");
                            None
                        }
                    }
                }
            })
            .buffer_unordered(self.concurrency)
            .filter_map(|point| async move { point })
            .collect()
            .await;

        let obtained = points.len();
        let series = TimeSeries::new(pair.clone(), points)?;
        if obtained < days as usize {
            info!(obtained, days, "Partial window obtained");
        }

        self.store.replace(&series).await?;
        debug!(points = series.len(), "Series stored");
        Ok(series)
    }

    /// The stored series for `pair`, without touching the provider.
    pub async fn cached(&self, pair: &CurrencyPair) -> Result<Option<TimeSeries>, ForexError> {
        Ok(self.store.load(pair).await?)
    }
}
