use anyhow::Result;
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use fxtrend::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    /// End date of the lookback window (YYYY-MM-DD), today by default
    #[arg(long, global = true)]
    as_of: Option<NaiveDate>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for fxtrend::AppCommand {
    fn from(cmd: Commands) -> fxtrend::AppCommand {
        match cmd {
            Commands::History { pair, days } => fxtrend::AppCommand::History { pair, days },
            Commands::Chart {
                pair,
                show,
                forecast,
            } => fxtrend::AppCommand::Chart {
                pair,
                show,
                forecast,
            },
            Commands::Forecast { pair, days } => fxtrend::AppCommand::Forecast { pair, days },
            Commands::Rates { base } => fxtrend::AppCommand::Rates { base },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Fetch and store the daily rate history of a pair, e.g. USD/COP
    History {
        pair: String,
        /// Days of history, at most 365
        #[arg(short, long)]
        days: Option<u32>,
    },
    /// Render the historical rate chart of a pair
    Chart {
        pair: String,
        /// Print the path of the last rendered chart instead of rendering
        #[arg(long)]
        show: bool,
        /// With --show, look up the forecast chart
        #[arg(long, requires = "show")]
        forecast: bool,
    },
    /// Forecast a pair with a linear trend and chart it
    Forecast {
        pair: String,
        /// Days to forecast, at most 30
        #[arg(short, long)]
        days: Option<u32>,
    },
    /// Show the latest rates published for a base currency
    Rates { base: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => fxtrend::cli::setup::setup(),
        Some(cmd) => {
            fxtrend::run_command(cmd.into(), cli.config_path.as_deref(), cli.as_of).await
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
