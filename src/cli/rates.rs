use super::ui;
use crate::core::{CurrencyCode, LatestRates};
use crate::service::ForexService;
use anyhow::Result;
use comfy_table::Cell;

pub async fn run(service: &ForexService, base: &CurrencyCode) -> Result<()> {
    let spinner = ui::new_spinner(&format!("Fetching latest {} rates", base));
    let result = service.get_latest(base).await;
    spinner.finish_and_clear();
    let latest = result?;

    let title = match latest.date {
        Some(date) => format!("1 {} on {}", latest.base, date),
        None => format!("1 {}", latest.base),
    };
    println!("\n{}", ui::style_text(&title, ui::StyleType::Title));
    if latest.rates.is_empty() {
        println!("No rates published for {}.", latest.base);
        return Ok(());
    }
    println!("{}", build_table(&latest));
    Ok(())
}

fn build_table(latest: &LatestRates) -> comfy_table::Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Currency"), ui::header_cell("Rate")]);
    for (quote, rate) in &latest.rates {
        table.add_row(vec![Cell::new(quote), ui::rate_cell(*rate)]);
    }
    table
}
