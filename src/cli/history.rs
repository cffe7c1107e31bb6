use super::ui;
use crate::core::history::MAX_LOOKBACK_DAYS;
use crate::core::{CurrencyPair, TimeSeries};
use crate::service::ForexService;
use anyhow::Result;
use comfy_table::{Cell, Row};

pub async fn run(service: &ForexService, pair: &CurrencyPair, days: u32) -> Result<()> {
    let spinner = ui::new_spinner(&format!("Fetching {} days of {}", days, pair));
    let result = service.get_historical(pair, days).await;
    spinner.finish_and_clear();
    let series = result?;

    println!(
        "\nHistorical rates: {}",
        ui::style_text(&pair.to_string(), ui::StyleType::Title)
    );
    println!("{}", build_table(&series));

    let requested = days.min(MAX_LOOKBACK_DAYS);
    println!(
        "{} {} of {} days",
        ui::style_text("Obtained:", ui::StyleType::TotalLabel),
        ui::style_text(&series.len().to_string(), ui::StyleType::TotalValue),
        requested
    );
    Ok(())
}

fn build_table(series: &TimeSeries) -> comfy_table::Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Date"),
        ui::header_cell(&format!("{} per {}", series.pair().quote(), series.pair().base())),
        ui::header_cell("Change"),
    ]);

    let mut previous: Option<f64> = None;
    for point in series.points() {
        let mut row = Row::new();
        row.add_cell(Cell::new(point.date));
        row.add_cell(ui::rate_cell(point.rate));
        row.add_cell(match previous {
            Some(prev) => ui::change_cell(point.rate - prev),
            None => Cell::new(""),
        });
        table.add_row(row);
        previous = Some(point.rate);
    }
    table
}
