//! Core business logic abstractions

pub mod chart;
pub mod config;
pub mod error;
pub mod forecast;
pub mod history;
pub mod log;
pub mod pair;
pub mod rates;
pub mod series;

// Re-export main types for cleaner imports
pub use chart::{ChartArtifact, ChartMode, ChartRenderer};
pub use error::{FetchError, ForexError, StoreError};
pub use forecast::{Forecast, ForecastEngine, LinearTrend};
pub use history::HistoricalCache;
pub use pair::{CurrencyCode, CurrencyPair};
pub use rates::{LatestRates, RateFetcher};
pub use series::{ForecastPoint, RatePoint, TimeSeries};
