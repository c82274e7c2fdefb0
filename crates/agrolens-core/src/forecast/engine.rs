use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::consts::{MAX_FORECAST_HORIZON_DAYS, MIN_FORECAST_POINTS};
use crate::error::{AgroError, Result};
use crate::indices::VegetationIndex;
use crate::progress::{EngineStage, NoOpReporter, ProgressReporter};
use crate::timeseries::{Provenance, TimeSeriesPoint};

use super::config::ForecastConfig;
use super::features::{date_features, FeatureRow};
use super::gbrt::GradientBoostedTrees;

/// Forecast output points share the series point shape.
pub type ForecastPoint = TimeSeriesPoint;

pub const MODEL_TYPE: &str = "gradient_boosted_trees";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForecastModelMetadata {
    pub model_type: String,
    pub training_point_count: usize,
    pub horizon_days: u32,
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    /// In-sample RMSE of the fitted ensemble.
    pub training_rmse: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ForecastResult {
    pub index: VegetationIndex,
    /// Input points unchanged, then one Forecast point per horizon day.
    pub points: Vec<ForecastPoint>,
    pub metadata: ForecastModelMetadata,
}

impl ForecastResult {
    pub fn forecast_points(&self) -> impl Iterator<Item = &ForecastPoint> {
        self.points
            .iter()
            .filter(|p| p.provenance == Provenance::Forecast)
    }
}

fn validate_series(points: &[TimeSeriesPoint], horizon_days: u32) -> Result<()> {
    if !(1..=MAX_FORECAST_HORIZON_DAYS).contains(&horizon_days) {
        return Err(AgroError::InvalidParameter(format!(
            "horizon must be between 1 and {MAX_FORECAST_HORIZON_DAYS} days, got {horizon_days}"
        )));
    }
    if points.len() < MIN_FORECAST_POINTS {
        return Err(AgroError::InsufficientHistory {
            got: points.len(),
            required: MIN_FORECAST_POINTS,
        });
    }
    if let Some(pair) = points.windows(2).find(|w| w[1].date <= w[0].date) {
        return Err(AgroError::InvalidParameter(format!(
            "series dates must be strictly ascending ({} followed by {})",
            pair[0].date, pair[1].date
        )));
    }
    if let Some(p) = points.iter().find(|p| !p.value.is_finite()) {
        return Err(AgroError::InvalidParameter(format!(
            "series value on {} is not finite",
            p.date
        )));
    }
    Ok(())
}

/// Fit a boosted-tree model on an already gap-filled series and extend it
/// `horizon_days` days past its last point.
///
/// The series is used as given: it is never re-sorted, deduplicated or
/// interpolated here. Predictions are clipped to the index's valid range.
pub fn forecast(
    points: &[TimeSeriesPoint],
    index: VegetationIndex,
    horizon_days: u32,
    config: &ForecastConfig,
) -> Result<ForecastResult> {
    forecast_reported(points, index, horizon_days, config, &NoOpReporter)
}

/// [`forecast`] reporting the training stage and one item per forecast day.
pub fn forecast_reported(
    points: &[TimeSeriesPoint],
    index: VegetationIndex,
    horizon_days: u32,
    config: &ForecastConfig,
    progress: &dyn ProgressReporter,
) -> Result<ForecastResult> {
    validate_series(points, horizon_days)?;
    config.validate()?;

    let origin = points[0].date;
    let x: Vec<FeatureRow> = points.iter().map(|p| date_features(p.date, origin)).collect();
    let y: Vec<f64> = points.iter().map(|p| p.value).collect();

    info!(
        %index,
        training_points = points.len(),
        horizon_days,
        n_estimators = config.n_estimators,
        "Training forecast model"
    );
    progress.begin_stage(EngineStage::TrainingModel, None);
    let model = GradientBoostedTrees::fit(&x, &y, config);
    let training_rmse = model.rmse(&x, &y);
    progress.finish_stage();

    let (lo, hi) = index.valid_range();
    let last = points[points.len() - 1].date;
    let mut out = points.to_vec();
    progress.begin_stage(EngineStage::Forecasting, Some(horizon_days as usize));
    out.extend((1..=horizon_days as i64).map(|day| {
        let date = last + Duration::days(day);
        let value = model
            .predict(&date_features(date, origin))
            .clamp(lo as f64, hi as f64);
        progress.advance(day as usize);
        ForecastPoint {
            date,
            value,
            provenance: Provenance::Forecast,
        }
    }));
    progress.finish_stage();

    info!(training_rmse, trees = model.n_trees(), "Forecast complete");

    Ok(ForecastResult {
        index,
        points: out,
        metadata: ForecastModelMetadata {
            model_type: MODEL_TYPE.to_string(),
            training_point_count: points.len(),
            horizon_days,
            n_estimators: config.n_estimators,
            learning_rate: config.learning_rate,
            max_depth: config.max_depth,
            training_rmse,
        },
    })
}
