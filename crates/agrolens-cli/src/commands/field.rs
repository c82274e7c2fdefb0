//! Field geometry, config and image-source arguments shared by commands.

use std::path::{Path, PathBuf};

use agrolens_core::config::EngineConfig;
use agrolens_core::consts::{DEFAULT_SYNTHETIC_GRID_SIZE, DEFAULT_SYNTHETIC_SEED};
use agrolens_core::source::SyntheticSource;
use anyhow::{bail, Context, Result};
use clap::Args;
use geo_types::{Coord, LineString, Polygon};
use tracing::{debug, info};

#[derive(Args)]
pub struct FieldArgs {
    /// Field boundary as a JSON ring file: [[lon, lat], ...]
    #[arg(long, conflicts_with = "bbox", required_unless_present = "bbox")]
    pub field: Option<PathBuf>,

    /// Field bounding box: west,south,east,north
    #[arg(long, value_delimiter = ',', num_args = 4, allow_negative_numbers = true)]
    pub bbox: Option<Vec<f64>>,

    /// Engine config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Seed for the synthetic image source
    #[arg(long, default_value_t = DEFAULT_SYNTHETIC_SEED)]
    pub seed: u64,

    /// Synthetic scene edge length in pixels
    #[arg(long, default_value_t = DEFAULT_SYNTHETIC_GRID_SIZE)]
    pub grid_size: usize,

    /// Share of synthetic pixels flagged as cloud (0-1)
    #[arg(long)]
    pub cloud_fraction: Option<f64>,
}

impl FieldArgs {
    pub fn polygon(&self) -> Result<Polygon<f64>> {
        match (&self.field, &self.bbox) {
            (Some(path), _) => load_ring(path),
            (None, Some(b)) => bbox_polygon(b),
            (None, None) => bail!("either --field or --bbox is required"),
        }
    }

    pub fn engine_config(&self) -> Result<EngineConfig> {
        match self.config {
            Some(ref path) => {
                info!(path = %path.display(), "Loading engine config");
                EngineConfig::load(path)
                    .with_context(|| format!("Invalid engine config {}", path.display()))
            }
            None => Ok(EngineConfig::default()),
        }
    }

    pub fn source(&self) -> SyntheticSource {
        let source = SyntheticSource::new(self.seed).with_grid_size(self.grid_size);
        match self.cloud_fraction {
            Some(f) => source.with_cloud_fraction(f),
            None => source,
        }
    }
}

fn load_ring(path: &Path) -> Result<Polygon<f64>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read field {}", path.display()))?;
    let ring: Vec<[f64; 2]> =
        serde_json::from_str(&contents).context("Field must be a JSON array of [lon, lat] pairs")?;
    if ring.len() < 3 {
        bail!("Field ring needs at least 3 vertices, got {}", ring.len());
    }
    debug!(vertices = ring.len(), "Loaded field ring");
    let coords: Vec<Coord<f64>> = ring.iter().map(|&[x, y]| Coord { x, y }).collect();
    Ok(Polygon::new(LineString::from(coords), vec![]))
}

fn bbox_polygon(b: &[f64]) -> Result<Polygon<f64>> {
    let &[west, south, east, north] = b else {
        bail!("--bbox takes exactly four values");
    };
    if west >= east || south >= north {
        bail!("--bbox must be west,south,east,north with west < east and south < north");
    }
    Ok(Polygon::new(
        LineString::from(vec![
            (west, south),
            (east, south),
            (east, north),
            (west, north),
            (west, south),
        ]),
        vec![],
    ))
}

pub fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
