use super::ui;
use crate::core::CurrencyPair;
use crate::core::forecast::MAX_HORIZON;
use crate::service::{ForecastReport, ForexService};
use anyhow::Result;
use comfy_table::Cell;

pub async fn run(service: &ForexService, pair: &CurrencyPair, horizon: usize) -> Result<()> {
    let spinner = ui::new_spinner(&format!("Forecasting {} days of {}", horizon, pair));
    let result = service.get_forecast(pair, horizon).await;
    spinner.finish_and_clear();
    let report = result?;

    if horizon > MAX_HORIZON {
        println!(
            "{}",
            ui::style_text(
                &format!("Horizon capped at {MAX_HORIZON} days"),
                ui::StyleType::Subtle
            )
        );
    }
    println!(
        "\nForecast: {}",
        ui::style_text(&report.pair, ui::StyleType::Title)
    );
    println!("{}", build_table(&report));
    println!(
        "{} {} per day over {} points",
        ui::style_text("Trend:", ui::StyleType::TotalLabel),
        ui::style_text(&format!("{:+.4}", report.trend.slope), ui::StyleType::TotalValue),
        report.history_points
    );
    println!(
        "{} {}",
        ui::style_text("Chart written to", ui::StyleType::TotalLabel),
        report.chart.path.display()
    );
    Ok(())
}

fn build_table(report: &ForecastReport) -> comfy_table::Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Date"), ui::header_cell("Predicted rate")]);
    for point in &report.points {
        table.add_row(vec![Cell::new(point.date), ui::rate_cell(point.rate)]);
    }
    table
}
