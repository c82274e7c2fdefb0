//! The four request contracts consumed by the application layer.
//!
//! Every call is a pure, single-request computation: nothing is cached or
//! shared between calls, so they may run on independent worker threads.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use geo_types::Polygon;
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::error::{AgroError, Result};
use crate::forecast::ForecastResult;
use crate::indices::{compute_index, compute_indices, VegetationIndex};
use crate::progress::{EngineStage, NoOpReporter, ProgressReporter};
use crate::raster::{GeoBounds, IndexRaster};
use crate::source::ImageSource;
use crate::stats::{aggregate, render_overlay, summarize, FieldStats, Overlay};
use crate::timeseries::{
    assemble, candidate_dates, fetch_observations, Cadence, CancelToken, SeriesOutcome,
    TimeSeriesPoint,
};
use crate::zoning::{check_zone_count, create_zones, ZoningResult};

/// Single-date analysis of a field.
#[derive(Clone, Debug)]
pub struct AnalysisResult {
    /// NDVI statistics, with per-index summaries of the other requested
    /// indices in `stats.extra`.
    pub stats: FieldStats,
    /// NDVI overlay.
    pub overlay: Overlay,
    /// Overlays of the other requested indices.
    pub index_overlays: BTreeMap<VegetationIndex, Overlay>,
    /// Kept so a later zoning request can reuse it without refetching.
    pub ndvi: IndexRaster,
    pub bounds: GeoBounds,
    pub pixel_area_m2: f64,
}

/// Analyze one field on one date.
pub fn analyze(
    source: &dyn ImageSource,
    geometry: &Polygon<f64>,
    date: NaiveDate,
    indices: &[VegetationIndex],
) -> Result<AnalysisResult> {
    analyze_reported(source, geometry, date, indices, &NoOpReporter)
}

/// [`analyze`] with stage-level progress reporting.
pub fn analyze_reported(
    source: &dyn ImageSource,
    geometry: &Polygon<f64>,
    date: NaiveDate,
    indices: &[VegetationIndex],
    progress: &dyn ProgressReporter,
) -> Result<AnalysisResult> {
    info!(source = source.name(), %date, ?indices, "Analyzing field");

    progress.begin_stage(EngineStage::FetchingImagery, Some(1));
    let scene = source.fetch(geometry, date)?;
    progress.finish_stage();

    progress.begin_stage(EngineStage::ComputingIndices, None);
    let mut rasters = compute_indices(&scene.bands, &scene.mask, indices)?.into_iter();
    progress.finish_stage();
    let ndvi = rasters
        .next()
        .ok_or_else(|| AgroError::Data("NDVI raster was not produced".into()))?;

    progress.begin_stage(EngineStage::Aggregating, None);
    let mut stats = aggregate(&ndvi, &scene.mask, scene.pixel_area_m2, scene.capture_date)?;
    let extras: Vec<IndexRaster> = rasters.collect();
    for raster in &extras {
        match summarize(raster) {
            Ok(summary) => {
                stats.extra.insert(raster.index, summary);
            }
            Err(AgroError::InsufficientData(reason)) => {
                warn!(index = %raster.index, %reason, "No valid pixels for index");
            }
            Err(e) => return Err(e),
        }
    }
    progress.finish_stage();

    progress.begin_stage(EngineStage::Rendering, Some(extras.len() + 1));
    let overlay = render_overlay(&ndvi, scene.bounds);
    let index_overlays = extras
        .iter()
        .map(|raster| (raster.index, render_overlay(raster, scene.bounds)))
        .collect();
    progress.finish_stage();

    info!(
        capture_date = %stats.capture_date,
        area_ha = stats.area_ha,
        mean_ndvi = stats.mean_index,
        cloud_coverage_percent = stats.cloud_coverage_percent,
        "Analysis complete"
    );

    Ok(AnalysisResult {
        stats,
        overlay,
        index_overlays,
        ndvi,
        bounds: scene.bounds,
        pixel_area_m2: scene.pixel_area_m2,
    })
}

/// What to zone: a fresh fetch, or the NDVI of an earlier analysis.
pub enum ZoneInput<'a> {
    Geometry {
        source: &'a dyn ImageSource,
        geometry: &'a Polygon<f64>,
        date: NaiveDate,
    },
    Prior(&'a AnalysisResult),
}

/// Delineate `num_zones` NDVI management zones.
pub fn zone(input: ZoneInput<'_>, num_zones: usize, config: &EngineConfig) -> Result<ZoningResult> {
    zone_reported(input, num_zones, config, &NoOpReporter)
}

/// [`zone`] with stage-level progress reporting.
pub fn zone_reported(
    input: ZoneInput<'_>,
    num_zones: usize,
    config: &EngineConfig,
    progress: &dyn ProgressReporter,
) -> Result<ZoningResult> {
    check_zone_count(num_zones)?;
    let fetched;
    let (ndvi, bounds, pixel_area_m2) = match input {
        ZoneInput::Prior(analysis) => (&analysis.ndvi, &analysis.bounds, analysis.pixel_area_m2),
        ZoneInput::Geometry {
            source,
            geometry,
            date,
        } => {
            info!(source = source.name(), %date, num_zones, "Fetching scene for zoning");
            progress.begin_stage(EngineStage::FetchingImagery, Some(1));
            let scene = source.fetch(geometry, date)?;
            progress.finish_stage();

            progress.begin_stage(EngineStage::ComputingIndices, None);
            let raster = compute_index(&scene.bands, &scene.mask, VegetationIndex::Ndvi)?;
            progress.finish_stage();

            fetched = (raster, scene.bounds, scene.pixel_area_m2);
            (&fetched.0, &fetched.1, fetched.2)
        }
    };

    progress.begin_stage(EngineStage::Zoning, None);
    let result = create_zones(ndvi, bounds, pixel_area_m2, num_zones, &config.zoning);
    progress.finish_stage();
    result
}

/// Assemble a gap-filled index series over `[start, end]`.
#[allow(clippy::too_many_arguments)]
pub fn series(
    source: &dyn ImageSource,
    geometry: &Polygon<f64>,
    index: VegetationIndex,
    start: NaiveDate,
    end: NaiveDate,
    cadence: Cadence,
    cancel: &CancelToken,
    config: &EngineConfig,
) -> Result<SeriesOutcome> {
    series_reported(
        source,
        geometry,
        index,
        start,
        end,
        cadence,
        cancel,
        config,
        &NoOpReporter,
    )
}

/// [`series`] with per-date progress reporting.
#[allow(clippy::too_many_arguments)]
pub fn series_reported(
    source: &dyn ImageSource,
    geometry: &Polygon<f64>,
    index: VegetationIndex,
    start: NaiveDate,
    end: NaiveDate,
    cadence: Cadence,
    cancel: &CancelToken,
    config: &EngineConfig,
    progress: &dyn ProgressReporter,
) -> Result<SeriesOutcome> {
    let dates = candidate_dates(start, end, cadence, config.series.max_points)?;
    info!(%index, %start, %end, %cadence, candidates = dates.len(), "Building series");

    let report = fetch_observations(
        source,
        geometry,
        index,
        &dates,
        cadence.observation_limit(config.series.max_points),
        &config.series,
        cancel,
        progress,
    )?;

    progress.begin_stage(EngineStage::AssemblingSeries, None);
    let outcome = assemble(report, index, start, end);
    progress.finish_stage();
    outcome
}

/// Extend a gap-filled series `horizon_days` into the future.
pub fn forecast(
    points: &[TimeSeriesPoint],
    index: VegetationIndex,
    horizon_days: u32,
    config: &EngineConfig,
) -> Result<ForecastResult> {
    forecast_reported(points, index, horizon_days, config, &NoOpReporter)
}

/// [`forecast`] with training and per-day progress reporting.
pub fn forecast_reported(
    points: &[TimeSeriesPoint],
    index: VegetationIndex,
    horizon_days: u32,
    config: &EngineConfig,
    progress: &dyn ProgressReporter,
) -> Result<ForecastResult> {
    crate::forecast::forecast_reported(points, index, horizon_days, &config.forecast, progress)
}
