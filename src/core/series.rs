//! Exchange rate observations and the per-pair series built from them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::error::ForexError;
use super::pair::CurrencyPair;

/// One daily observation: `rate` units of quote per one unit of base.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatePoint {
    pub date: NaiveDate,
    pub rate: f64,
}

impl RatePoint {
    pub fn new(date: NaiveDate, rate: f64) -> Self {
        Self { date, rate }
    }
}

/// A projected rate. Never persisted with the series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub rate: f64,
}

/// Non-empty series for a single pair, ascending by date with at most one
/// point per date.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    pair: CurrencyPair,
    points: Vec<RatePoint>,
}

impl TimeSeries {
    /// Builds a series from points in any order. When a date repeats, the
    /// later point wins. Fails with `NoData` when nothing is left.
    pub fn new(
        pair: CurrencyPair,
        points: impl IntoIterator<Item = RatePoint>,
    ) -> Result<Self, ForexError> {
        let by_date: BTreeMap<NaiveDate, f64> =
            points.into_iter().map(|p| (p.date, p.rate)).collect();
        if by_date.is_empty() {
            return Err(ForexError::NoData { pair });
        }
        let points = by_date
            .into_iter()
            .map(|(date, rate)| RatePoint { date, rate })
            .collect();
        Ok(Self { pair, points })
    }

    pub fn pair(&self) -> &CurrencyPair {
        &self.pair
    }

    pub fn points(&self) -> &[RatePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> &RatePoint {
        // Non-empty by construction.
        &self.points[0]
    }

    pub fn last(&self) -> &RatePoint {
        &self.points[self.points.len() - 1]
    }

    pub fn rates(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.rate)
    }

    /// (min, max) of the rates.
    pub fn rate_bounds(&self) -> (f64, f64) {
        self.rates()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), r| {
                (lo.min(r), hi.max(r))
            })
    }
}
