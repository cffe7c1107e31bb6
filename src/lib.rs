pub mod cli;
pub mod core;
pub mod providers;
pub mod service;
pub mod store;

use crate::core::config::AppConfig;
use crate::core::{ChartMode, CurrencyCode, CurrencyPair};
use crate::service::ForexService;
use anyhow::Result;
use chrono::NaiveDate;
use tracing::{debug, info};

pub enum AppCommand {
    History { pair: String, days: Option<u32> },
    Chart {
        pair: String,
        /// Only print the path of the last rendered chart
        show: bool,
        forecast: bool,
    },
    Forecast { pair: String, days: Option<u32> },
    Rates { base: String },
}

/// Loads the config, applies command line overrides and runs one command.
pub async fn run_command(
    command: AppCommand,
    config_path: Option<&str>,
    as_of: Option<NaiveDate>,
) -> Result<()> {
    info!("fxtrend starting...");

    let mut config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    if as_of.is_some() {
        config.reference_date = as_of;
    }
    debug!("Loaded config: {config:#?}");

    let service = ForexService::from_config(&config)?;

    match command {
        AppCommand::History { pair, days } => {
            let pair: CurrencyPair = pair.parse()?;
            let days = days.unwrap_or(config.defaults.lookback_days);
            cli::history::run(&service, &pair, days).await
        }
        AppCommand::Chart {
            pair,
            show,
            forecast,
        } => {
            let pair: CurrencyPair = pair.parse()?;
            if show {
                let mode = if forecast {
                    ChartMode::Forecast
                } else {
                    ChartMode::Historical
                };
                cli::chart::show(&service, &pair, mode)
            } else {
                cli::chart::run(&service, &pair).await
            }
        }
        AppCommand::Forecast { pair, days } => {
            let pair: CurrencyPair = pair.parse()?;
            let horizon = days.unwrap_or(config.defaults.horizon);
            cli::forecast::run(&service, &pair, horizon as usize).await
        }
        AppCommand::Rates { base } => {
            let base: CurrencyCode = base.parse()?;
            cli::rates::run(&service, &base).await
        }
    }
}
