use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consts::{LOW_BAND_UPPER, M2_PER_HECTARE, MEDIUM_BAND_UPPER};
use crate::error::{AgroError, Result};
use crate::indices::VegetationIndex;
use crate::raster::{IndexRaster, SceneMask};

/// Mean / min / max / standard deviation over valid pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndexSummary {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub std: f64,
    pub valid_pixel_count: usize,
}

/// Share of valid pixels in each fixed vegetation band, in percent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneDistribution {
    /// index < 0.3
    pub low: f64,
    /// 0.3 <= index < 0.6
    pub medium: f64,
    /// index >= 0.6
    pub high: f64,
}

impl ZoneDistribution {
    pub fn total(&self) -> f64 {
        self.low + self.medium + self.high
    }
}

/// Field-level statistics for one index on one capture date.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldStats {
    pub index: VegetationIndex,
    pub area_ha: f64,
    pub mean_index: f64,
    pub min_index: f64,
    pub max_index: f64,
    pub std_index: f64,
    pub capture_date: NaiveDate,
    pub cloud_coverage_percent: f64,
    pub valid_pixels_percent: f64,
    pub valid_pixel_count: usize,
    pub zones_percent: ZoneDistribution,
    /// Statistics of the additionally requested indices.
    #[serde(default)]
    pub extra: BTreeMap<VegetationIndex, IndexSummary>,
}

/// Reduce the valid pixels of an index raster to summary statistics.
///
/// Returns `InsufficientData` when no pixel is valid.
pub fn summarize(raster: &IndexRaster) -> Result<IndexSummary> {
    let mut n = 0usize;
    let mut sum = 0.0f64;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in raster.valid_values() {
        let v = v as f64;
        n += 1;
        sum += v;
        min = min.min(v);
        max = max.max(v);
    }
    if n == 0 {
        return Err(AgroError::InsufficientData(format!(
            "no valid {} pixels inside the field",
            raster.index
        )));
    }
    let mean = sum / n as f64;
    let var = raster
        .valid_values()
        .map(|v| (v as f64 - mean).powi(2))
        .sum::<f64>()
        / n as f64;
    Ok(IndexSummary {
        mean,
        min,
        max,
        std: var.sqrt(),
        valid_pixel_count: n,
    })
}

/// Bucket valid values into the low / medium / high bands.
pub fn zone_distribution(raster: &IndexRaster) -> ZoneDistribution {
    let (mut low, mut medium, mut high) = (0usize, 0usize, 0usize);
    for v in raster.valid_values() {
        if v < LOW_BAND_UPPER {
            low += 1;
        } else if v < MEDIUM_BAND_UPPER {
            medium += 1;
        } else {
            high += 1;
        }
    }
    let n = (low + medium + high) as f64;
    if n == 0.0 {
        return ZoneDistribution::default();
    }
    ZoneDistribution {
        low: low as f64 / n * 100.0,
        medium: medium as f64 / n * 100.0,
        high: high as f64 / n * 100.0,
    }
}

/// Cloud coverage inside the field polygon, in percent, from the scene mask.
pub fn cloud_coverage_percent(mask: &SceneMask) -> Result<f64> {
    let counts = mask.counts();
    if counts.inside() == 0 {
        return Err(AgroError::InsufficientData(
            "field footprint covers no pixel of the scene".into(),
        ));
    }
    Ok(counts.cloud as f64 / counts.inside() as f64 * 100.0)
}

/// Build `FieldStats` for the primary index raster.
pub fn aggregate(
    raster: &IndexRaster,
    mask: &SceneMask,
    pixel_area_m2: f64,
    capture_date: NaiveDate,
) -> Result<FieldStats> {
    if raster.dim() != mask.dim() {
        return Err(AgroError::Data(format!(
            "index raster {:?} and scene mask {:?} are not co-registered",
            raster.dim(),
            mask.dim()
        )));
    }
    let cloud_coverage_percent = cloud_coverage_percent(mask)?;
    let summary = summarize(raster)?;
    let area_ha = summary.valid_pixel_count as f64 * pixel_area_m2 / M2_PER_HECTARE;

    debug!(
        index = %raster.index,
        valid_pixels = summary.valid_pixel_count,
        cloud_coverage_percent,
        "Aggregated field statistics"
    );

    Ok(FieldStats {
        index: raster.index,
        area_ha,
        mean_index: summary.mean,
        min_index: summary.min,
        max_index: summary.max,
        std_index: summary.std,
        capture_date,
        cloud_coverage_percent,
        valid_pixels_percent: 100.0 - cloud_coverage_percent,
        valid_pixel_count: summary.valid_pixel_count,
        zones_percent: zone_distribution(raster),
        extra: BTreeMap::new(),
    })
}
