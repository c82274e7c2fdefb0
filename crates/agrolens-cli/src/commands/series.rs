use std::path::PathBuf;

use agrolens_core::engine::series_reported;
use agrolens_core::indices::VegetationIndex;
use agrolens_core::timeseries::{Cadence, CancelToken};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;

use super::field::{write_json, FieldArgs};
use crate::progress::BarReporter;
use crate::summary::print_series_summary;

#[derive(Args)]
pub struct SeriesArgs {
    #[command(flatten)]
    pub field: FieldArgs,

    /// First date of the range (YYYY-MM-DD)
    #[arg(long)]
    pub start: NaiveDate,

    /// Last date of the range (YYYY-MM-DD)
    #[arg(long)]
    pub end: NaiveDate,

    /// Vegetation index
    #[arg(long, default_value = "NDVI")]
    pub index: String,

    /// Sampling cadence: "auto" or a day count such as "10d"
    #[arg(long, default_value = "auto")]
    pub cadence: String,

    /// Write the series as JSON (input for `forecast`)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: &SeriesArgs) -> Result<()> {
    let geometry = args.field.polygon()?;
    let config = args.field.engine_config()?;
    let source = args.field.source();
    let index: VegetationIndex = args.index.parse()?;
    let cadence: Cadence = args.cadence.parse()?;

    let reporter = BarReporter::new()?;
    let outcome = series_reported(
        &source,
        &geometry,
        index,
        args.start,
        args.end,
        cadence,
        &CancelToken::new(),
        &config,
        &reporter,
    )
    .with_context(|| format!("Series failed for {} to {}", args.start, args.end))?;
    reporter.finish();

    print_series_summary(&outcome);

    if let Some(ref path) = args.output {
        write_json(path, &outcome)?;
        println!("Series saved to {}", path.display());
    }
    Ok(())
}
