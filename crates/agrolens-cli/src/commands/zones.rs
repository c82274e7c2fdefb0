use std::path::PathBuf;

use agrolens_core::engine::{zone_reported, ZoneInput};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;

use super::field::{write_json, FieldArgs};
use crate::progress::BarReporter;
use crate::summary::print_zoning_summary;

#[derive(Args)]
pub struct ZonesArgs {
    #[command(flatten)]
    pub field: FieldArgs,

    /// Acquisition date (YYYY-MM-DD)
    #[arg(long)]
    pub date: NaiveDate,

    /// Number of zones (3, 4 or 5)
    #[arg(short = 'k', long, default_value = "3")]
    pub zones: usize,

    /// Write the zones as a GeoJSON FeatureCollection
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: &ZonesArgs) -> Result<()> {
    let geometry = args.field.polygon()?;
    let config = args.field.engine_config()?;
    let source = args.field.source();

    let reporter = BarReporter::new()?;
    let result = zone_reported(
        ZoneInput::Geometry {
            source: &source,
            geometry: &geometry,
            date: args.date,
        },
        args.zones,
        &config,
        &reporter,
    )
    .with_context(|| format!("Zoning failed for {}", args.date))?;
    reporter.finish();

    print_zoning_summary(&result);

    if let Some(ref path) = args.output {
        write_json(path, &result.features.to_geojson())?;
        println!("Zones saved to {}", path.display());
    }
    Ok(())
}
