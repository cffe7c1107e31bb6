//! Entry point composing the cache, forecaster and chart renderer.

use anyhow::Context;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

use crate::core::config::{AppConfig, ReferenceDate};
use crate::core::{
    ChartArtifact, ChartMode, ChartRenderer, CurrencyCode, CurrencyPair, ForecastEngine,
    ForecastPoint, ForexError, HistoricalCache, LatestRates, LinearTrend, RateFetcher, TimeSeries,
};
use crate::providers::exchangerate_host::ExchangeRateHostProvider;
use crate::store::{self, SeriesStore};

pub const DEFAULT_LOOKBACK_DAYS: u32 = 30;

#[derive(Debug, Clone, Serialize)]
pub struct ForecastReport {
    pub pair: String,
    pub history_points: usize,
    pub trend: LinearTrend,
    pub points: Vec<ForecastPoint>,
    #[serde(skip)]
    pub chart: ChartArtifact,
}

pub struct ForexService {
    cache: HistoricalCache,
    fetcher: Arc<dyn RateFetcher>,
    engine: ForecastEngine,
    renderer: ChartRenderer,
    default_lookback: u32,
    pair_locks: Mutex<HashMap<CurrencyPair, Arc<Mutex<()>>>>,
}

impl ForexService {
    pub fn new(
        fetcher: Arc<dyn RateFetcher>,
        store: Arc<dyn SeriesStore>,
        renderer: ChartRenderer,
        reference: ReferenceDate,
        concurrency: usize,
    ) -> Self {
        Self {
            cache: HistoricalCache::new(Arc::clone(&fetcher), store, reference, concurrency),
            fetcher,
            engine: ForecastEngine::new(),
            renderer,
            default_lookback: DEFAULT_LOOKBACK_DAYS,
            pair_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Wires the HTTP provider, the configured store and a renderer writing
    /// under `{data_dir}/charts`.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let provider = ExchangeRateHostProvider::new(&config.provider)
            .context("Failed to build HTTP client")?;
        let store = store::open_store(config)?;
        let renderer = ChartRenderer::new(
            config.data_dir()?.join("charts"),
            config.chart.width,
            config.chart.height,
        );
        Ok(Self::new(
            Arc::new(provider),
            store,
            renderer,
            config.reference(),
            config.provider.concurrency,
        )
        .with_default_lookback(config.defaults.lookback_days))
    }

    /// Window used by `get_chart` and `get_forecast` when nothing is stored.
    pub fn with_default_lookback(mut self, days: u32) -> Self {
        self.default_lookback = days;
        self
    }

    /// Serializes operations on one pair. Locks nobody holds or waits on
    /// are dropped from the map on the way in.
    async fn lock_pair(&self, pair: &CurrencyPair) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.pair_locks.lock().await;
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(pair.clone()).or_default())
        };
        lock.lock_owned().await
    }

    /// Refetches the whole window (capped at 365 days) and returns it.
    pub async fn get_historical(
        &self,
        pair: &CurrencyPair,
        lookback_days: u32,
    ) -> Result<TimeSeries, ForexError> {
        let _guard = self.lock_pair(pair).await;
        self.cache.ensure(pair, lookback_days).await
    }

    async fn stored_or_fetch(&self, pair: &CurrencyPair) -> Result<TimeSeries, ForexError> {
        match self.cache.cached(pair).await {
            Ok(Some(series)) => {
                debug!(%pair, points = series.len(), "Using stored series");
                return Ok(series);
            }
            Ok(None) => info!(%pair, "No stored series, fetching default window"),
            Err(e) => warn!(%pair, error = %e, "Stored series unreadable, refetching"),
        }
        self.cache.ensure(pair, self.default_lookback).await
    }

    pub async fn get_chart(&self, pair: &CurrencyPair) -> Result<ChartArtifact, ForexError> {
        let _guard = self.lock_pair(pair).await;
        let series = self.stored_or_fetch(pair).await?;
        self.renderer.render_historical(&series)
    }

    /// Forecasts `horizon` days (capped at 30) and renders the combined chart.
    pub async fn get_forecast(
        &self,
        pair: &CurrencyPair,
        horizon: usize,
    ) -> Result<ForecastReport, ForexError> {
        let _guard = self.lock_pair(pair).await;
        let series = self.stored_or_fetch(pair).await?;
        let forecast = self.engine.forecast(&series, horizon)?;
        let chart = self.renderer.render_forecast(&series, &forecast.points)?;

        Ok(ForecastReport {
            pair: pair.to_string(),
            history_points: series.len(),
            trend: forecast.trend,
            points: forecast.points,
            chart,
        })
    }

    pub async fn get_latest(&self, base: &CurrencyCode) -> Result<LatestRates, ForexError> {
        Ok(self.fetcher.latest(base).await?)
    }

    /// Path of the last chart rendered for `pair` in `mode`, if any.
    pub fn find_chart(&self, pair: &CurrencyPair, mode: ChartMode) -> Option<PathBuf> {
        let path = self.renderer.path_for(pair, mode);
        path.exists().then_some(path)
    }
}
