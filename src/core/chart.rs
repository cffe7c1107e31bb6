//! PNG line charts of a rate series, optionally with its forecast.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use plotters::prelude::*;
use serde::Serialize;
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

use super::error::ForexError;
use super::pair::CurrencyPair;
use super::series::{ForecastPoint, TimeSeries};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartMode {
    Historical,
    Forecast,
}

impl Display for ChartMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ChartMode::Historical => "historical",
            ChartMode::Forecast => "forecast",
        })
    }
}

/// A rendered chart: where it was written and the PNG bytes.
#[derive(Debug, Clone)]
pub struct ChartArtifact {
    pub pair: CurrencyPair,
    pub mode: ChartMode,
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

pub struct ChartRenderer {
    dir: PathBuf,
    width: u32,
    height: u32,
}

impl ChartRenderer {
    pub fn new(dir: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        Self {
            dir: dir.into(),
            width,
            height,
        }
    }

    /// Location of the chart for `pair` in `mode`; overwritten on each render.
    pub fn path_for(&self, pair: &CurrencyPair, mode: ChartMode) -> PathBuf {
        self.dir.join(format!("{}_{}.png", pair.slug(), mode))
    }

    pub fn render_historical(&self, series: &TimeSeries) -> Result<ChartArtifact, ForexError> {
        self.render(series, None)
    }

    pub fn render_forecast(
        &self,
        series: &TimeSeries,
        forecast: &[ForecastPoint],
    ) -> Result<ChartArtifact, ForexError> {
        self.render(series, Some(forecast))
    }

    #[instrument(name = "ChartRender", skip_all, fields(pair = %series.pair()))]
    fn render(
        &self,
        series: &TimeSeries,
        forecast: Option<&[ForecastPoint]>,
    ) -> Result<ChartArtifact, ForexError> {
        let mode = if forecast.is_some() {
            ChartMode::Forecast
        } else {
            ChartMode::Historical
        };
        let path = self.path_for(series.pair(), mode);
        let render_error = |reason: String| ForexError::Render {
            path: path.clone(),
            reason,
        };

        fs::create_dir_all(&self.dir).map_err(|e| render_error(e.to_string()))?;
        // BitMapBackend picks the encoder from the extension, so keep `.png` last.
        let tmp_path = path.with_extension("tmp.png");

        self.draw(&tmp_path, series, forecast)
            .map_err(|e| render_error(e.to_string()))?;
        fs::rename(&tmp_path, &path).map_err(|e| render_error(e.to_string()))?;
        let bytes = fs::read(&path).map_err(|e| render_error(e.to_string()))?;

        debug!(path = %path.display(), size = bytes.len(), %mode, "Chart written");
        Ok(ChartArtifact {
            pair: series.pair().clone(),
            mode,
            path,
            bytes,
        })
    }

    fn draw(
        &self,
        out: &Path,
        series: &TimeSeries,
        forecast: Option<&[ForecastPoint]>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let pair = series.pair();
        let forecast = forecast.unwrap_or_default();

        let historical: Vec<(DateTime<Utc>, f64)> = series
            .points()
            .iter()
            .map(|p| (at_midnight(p.date), p.rate))
            .collect();
        let projected: Vec<(DateTime<Utc>, f64)> = forecast
            .iter()
            .map(|p| (at_midnight(p.date), p.rate))
            .collect();

        let (mut lo, mut hi) = series.rate_bounds();
        for point in forecast {
            lo = lo.min(point.rate);
            hi = hi.max(point.rate);
        }
        let padding = (hi - lo).max(hi.abs() * 0.01).max(1e-8) * 0.1;
        let y_range = (lo - padding).max(0.0)..(hi + padding);

        let first = series.first().date;
        let last = forecast.last().map_or(series.last().date, |p| p.date);
        // A one-day range would collapse the axis.
        let x_range = if first == last {
            at_midnight(first - Duration::days(1))..at_midnight(last + Duration::days(1))
        } else {
            at_midnight(first)..at_midnight(last)
        };

        let root = BitMapBackend::new(out, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE)?;

        let title = if forecast.is_empty() {
            format!("{} exchange rate", pair)
        } else {
            format!("{} exchange rate forecast", pair)
        };
        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 32.0).into_font())
            .margin(15)
            .x_label_area_size(50)
            .y_label_area_size(80)
            .build_cartesian_2d(x_range, y_range)?;

        chart
            .configure_mesh()
            .x_desc("Date")
            .y_desc(format!("Rate ({} per 1 {})", pair.quote(), pair.base()))
            .x_label_formatter(&|d: &DateTime<Utc>| d.format("%Y-%m-%d").to_string())
            .y_label_formatter(&|r: &f64| format!("{r:.4}"))
            .draw()?;

        chart
            .draw_series(LineSeries::new(historical.iter().copied(), BLUE.stroke_width(2)))?
            .label("Historical")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.stroke_width(2)));
        chart.draw_series(
            historical
                .iter()
                .map(|(x, y)| Circle::new((*x, *y), 3, BLUE.filled())),
        )?;

        if !projected.is_empty() {
            chart
                .draw_series(LineSeries::new(projected.iter().copied(), RED.stroke_width(2)))?
                .label("Forecast")
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(2)));
            chart.draw_series(
                projected
                    .iter()
                    .map(|(x, y)| Cross::new((*x, *y), 5, RED.stroke_width(2))),
            )?;

            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperLeft)
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()?;
        }

        root.present()?;
        Ok(())
    }
}

fn at_midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::series::RatePoint;
    use tempfile::tempdir;

    const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn series(len: i64) -> TimeSeries {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let pair = CurrencyPair::new("USD", "COP").unwrap();
        TimeSeries::new(
            pair,
            (0..len).map(|i| RatePoint::new(start + Duration::days(i), 4600.0 + (i * 7 % 11) as f64)),
        )
        .unwrap()
    }

    #[test]
    fn test_render_historical_png() {
        let dir = tempdir().unwrap();
        let renderer = ChartRenderer::new(dir.path(), 640, 320);

        let artifact = renderer.render_historical(&series(30)).unwrap();
        assert_eq!(artifact.mode, ChartMode::Historical);
        assert_eq!(artifact.path, dir.path().join("USD_COP_historical.png"));
        assert!(artifact.bytes.starts_with(PNG_SIGNATURE));
        assert_eq!(fs::read(&artifact.path).unwrap(), artifact.bytes);
        assert!(!dir.path().join("USD_COP_historical.tmp.png").exists());
    }

    #[test]
    fn test_render_forecast_png() {
        let dir = tempdir().unwrap();
        let renderer = ChartRenderer::new(dir.path(), 640, 320);
        let series = series(10);
        let last = series.last().date;
        let forecast: Vec<ForecastPoint> = (1..=5)
            .map(|i| ForecastPoint {
                date: last + Duration::days(i),
                rate: 4610.0 + i as f64,
            })
            .collect();

        let artifact = renderer.render_forecast(&series, &forecast).unwrap();
        assert_eq!(artifact.mode, ChartMode::Forecast);
        assert_eq!(artifact.path, dir.path().join("USD_COP_forecast.png"));
        assert!(artifact.bytes.starts_with(PNG_SIGNATURE));
    }

    #[test]
    fn test_render_single_point_series() {
        let dir = tempdir().unwrap();
        let renderer = ChartRenderer::new(dir.path(), 320, 240);
        let artifact = renderer.render_historical(&series(1)).unwrap();
        assert!(artifact.bytes.starts_with(PNG_SIGNATURE));
    }

    #[test]
    fn test_unwritable_directory_is_render_error() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        fs::write(&blocker, b"file").unwrap();
        let renderer = ChartRenderer::new(blocker.join("charts"), 320, 240);

        let result = renderer.render_historical(&series(3));
        assert!(matches!(result, Err(ForexError::Render { .. })));
    }
}
