mod commands;
mod progress;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "agrolens", about = "Field vegetation analysis and forecasting")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute indices, statistics and overlays for one date
    Analyze(commands::analyze::AnalyzeArgs),
    /// Delineate management zones
    Zones(commands::zones::ZonesArgs),
    /// Build a gap-filled index time series
    Series(commands::series::SeriesArgs),
    /// Forecast a saved time series
    Forecast(commands::forecast::ForecastArgs),
    /// List supported vegetation indices
    Indices(commands::indices::IndicesArgs),
    /// Print, save or validate the engine config
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Analyze(args) => commands::analyze::run(args),
        Commands::Zones(args) => commands::zones::run(args),
        Commands::Series(args) => commands::series::run(args),
        Commands::Forecast(args) => commands::forecast::run(args),
        Commands::Indices(args) => commands::indices::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
