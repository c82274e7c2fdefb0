use std::path::PathBuf;

use agrolens_core::engine::forecast_reported;
use agrolens_core::indices::VegetationIndex;
use agrolens_core::timeseries::TimeSeriesPoint;
use anyhow::{Context, Result};
use clap::Args;
use serde::Deserialize;

use super::field::write_json;
use crate::progress::BarReporter;
use crate::summary::print_forecast_summary;

#[derive(Args)]
pub struct ForecastArgs {
    /// Series JSON written by `series --output`, or a bare point array
    pub file: PathBuf,

    /// Days to forecast past the last point (1-90)
    #[arg(long, default_value = "30")]
    pub horizon: u32,

    /// Index of the series; read from the file when omitted
    #[arg(long)]
    pub index: Option<String>,

    /// Engine config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write the forecast as JSON
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SeriesFile {
    Outcome {
        index: VegetationIndex,
        points: Vec<TimeSeriesPoint>,
    },
    Points(Vec<TimeSeriesPoint>),
}

pub fn run(args: &ForecastArgs) -> Result<()> {
    let contents = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read series {}", args.file.display()))?;
    let parsed: SeriesFile = serde_json::from_str(&contents).context("Invalid series file")?;
    let (file_index, points) = match parsed {
        SeriesFile::Outcome { index, points } => (Some(index), points),
        SeriesFile::Points(points) => (None, points),
    };
    let index = match args.index {
        Some(ref name) => name.parse()?,
        None => file_index.unwrap_or(VegetationIndex::Ndvi),
    };

    let config = match args.config {
        Some(ref path) => agrolens_core::config::EngineConfig::load(path)
            .with_context(|| format!("Invalid engine config {}", path.display()))?,
        None => Default::default(),
    };

    let reporter = BarReporter::new()?;
    let result = forecast_reported(&points, index, args.horizon, &config, &reporter)
        .context("Forecast failed")?;
    reporter.finish();
    print_forecast_summary(&result);

    if let Some(ref path) = args.output {
        write_json(path, &result)?;
        println!("Forecast saved to {}", path.display());
    }
    Ok(())
}
