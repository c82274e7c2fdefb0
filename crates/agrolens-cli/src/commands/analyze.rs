use std::path::{Path, PathBuf};

use agrolens_core::engine::analyze_reported;
use agrolens_core::indices::VegetationIndex;
use agrolens_core::stats::save_png;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;
use serde_json::json;

use super::field::{write_json, FieldArgs};
use crate::progress::BarReporter;
use crate::summary::print_analysis_summary;

#[derive(Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub field: FieldArgs,

    /// Acquisition date (YYYY-MM-DD)
    #[arg(long)]
    pub date: NaiveDate,

    /// Comma-separated extra indices (NDVI is always computed)
    #[arg(long, value_delimiter = ',')]
    pub indices: Vec<String>,

    /// Write statistics as JSON
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write the NDVI overlay PNG; other indices go next to it
    #[arg(long)]
    pub overlay: Option<PathBuf>,
}

pub fn parse_indices(names: &[String]) -> Result<Vec<VegetationIndex>> {
    names
        .iter()
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.parse::<VegetationIndex>().map_err(anyhow::Error::from))
        .collect()
}

pub fn run(args: &AnalyzeArgs) -> Result<()> {
    let geometry = args.field.polygon()?;
    let source = args.field.source();
    let indices = parse_indices(&args.indices)?;

    let reporter = BarReporter::new()?;
    let result = analyze_reported(&source, &geometry, args.date, &indices, &reporter)
        .with_context(|| format!("Analysis failed for {}", args.date))?;
    reporter.finish();

    print_analysis_summary(&result);

    if let Some(ref path) = args.overlay {
        save_png(&result.overlay, path)
            .with_context(|| format!("Failed to write overlay {}", path.display()))?;
        for (index, overlay) in &result.index_overlays {
            let extra = sibling_path(path, index.code());
            save_png(overlay, &extra)
                .with_context(|| format!("Failed to write overlay {}", extra.display()))?;
        }
        println!("Overlay saved to {}", path.display());
    }

    if let Some(ref path) = args.output {
        let doc = json!({
            "stats": result.stats,
            "bounds": result.bounds.to_lat_lon_pairs(),
            "pixel_area_m2": result.pixel_area_m2,
        });
        write_json(path, &doc)?;
        println!("Statistics saved to {}", path.display());
    }

    Ok(())
}

fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "overlay".into());
    path.with_file_name(format!("{stem}_{}.png", suffix.to_ascii_lowercase()))
}
