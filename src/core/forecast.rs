//! Linear trend forecasting over a rate series.

use chrono::Duration;
use serde::Serialize;
use tracing::debug;

use super::error::ForexError;
use super::series::{ForecastPoint, TimeSeries};

/// Fewest points a trend is fitted on.
pub const MIN_POINTS: usize = 7;
/// Longest horizon, in days; larger requests are capped.
pub const MAX_HORIZON: usize = 30;

/// `rate = intercept + slope * index`, fitted by ordinary least squares.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearTrend {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearTrend {
    /// Fits `values[i]` against `i`. Returns `None` for an empty slice.
    pub fn fit(values: &[f64]) -> Option<Self> {
        let n = values.len();
        if n == 0 {
            return None;
        }
        let n_f = n as f64;
        let mean_x = (n_f - 1.0) / 2.0;
        let mean_y = values.iter().sum::<f64>() / n_f;

        let (sxy, sxx) = values
            .iter()
            .enumerate()
            .fold((0.0, 0.0), |(sxy, sxx), (i, y)| {
                let dx = i as f64 - mean_x;
                (sxy + dx * (y - mean_y), sxx + dx * dx)
            });

        // A single point has no spread in x; the best line is flat.
        let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };
        Some(Self {
            slope,
            intercept: mean_y - slope * mean_x,
        })
    }

    pub fn value_at(&self, index: usize) -> f64 {
        self.intercept + self.slope * index as f64
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Forecast {
    pub trend: LinearTrend,
    pub points: Vec<ForecastPoint>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ForecastEngine;

impl ForecastEngine {
    pub fn new() -> Self {
        Self
    }

    /// Projects `horizon` days (capped at [`MAX_HORIZON`]) past the end of
    /// `series`, one point per calendar day, rates rounded to 4 decimals.
    pub fn forecast(&self, series: &TimeSeries, horizon: usize) -> Result<Forecast, ForexError> {
        if series.len() < MIN_POINTS {
            return Err(ForexError::InsufficientData {
                pair: series.pair().clone(),
                required: MIN_POINTS,
                found: series.len(),
            });
        }
        let horizon = horizon.min(MAX_HORIZON);
        let values: Vec<f64> = series.rates().collect();
        let trend = LinearTrend::fit(&values).ok_or_else(|| ForexError::NoData {
            pair: series.pair().clone(),
        })?;
        debug!(pair = %series.pair(), ?trend, horizon, "Fitted linear trend");

        let n = series.len();
        let last_date = series.last().date;
        let points = (0..horizon)
            .map(|step| ForecastPoint {
                date: last_date + Duration::days(step as i64 + 1),
                rate: round4(trend.value_at(n + step)),
            })
            .collect();

        Ok(Forecast { trend, points })
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
