//! Exchange rate provider abstractions

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use super::error::FetchError;
use super::pair::{CurrencyCode, CurrencyPair};
use super::series::RatePoint;

/// Every rate a provider publishes for one base currency, keyed by quote code.
#[derive(Debug, Clone, Serialize)]
pub struct LatestRates {
    pub base: CurrencyCode,
    pub date: Option<NaiveDate>,
    pub rates: BTreeMap<String, f64>,
}

#[async_trait]
pub trait RateFetcher: Send + Sync {
    /// Fetches the observation for `pair` on `date`. Makes at most one
    /// logical request; a day without data is `FetchError::MissingData`.
    async fn fetch(&self, pair: &CurrencyPair, date: NaiveDate) -> Result<RatePoint, FetchError>;

    async fn latest(&self, base: &CurrencyCode) -> Result<LatestRates, FetchError>;
}
