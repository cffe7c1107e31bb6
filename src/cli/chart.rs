use super::ui;
use crate::core::{ChartMode, CurrencyPair};
use crate::service::ForexService;
use anyhow::Result;

pub async fn run(service: &ForexService, pair: &CurrencyPair) -> Result<()> {
    let spinner = ui::new_spinner(&format!("Rendering {} chart", pair));
    let result = service.get_chart(pair).await;
    spinner.finish_and_clear();
    let artifact = result?;

    println!(
        "{} {}",
        ui::style_text("Chart written to", ui::StyleType::TotalLabel),
        artifact.path.display()
    );
    println!(
        "{}",
        ui::style_text(
            &format!("{} ({} bytes)", artifact.mode, artifact.bytes.len()),
            ui::StyleType::Subtle
        )
    );
    Ok(())
}

/// Prints the path of the last chart rendered for `pair`, without fetching
/// or rendering.
pub fn show(service: &ForexService, pair: &CurrencyPair, mode: ChartMode) -> Result<()> {
    let Some(path) = service.find_chart(pair, mode) else {
        anyhow::bail!("No {} chart rendered yet for {}", mode, pair);
    };
    println!("{}", path.display());
    Ok(())
}
