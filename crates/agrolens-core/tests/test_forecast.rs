mod common;

use agrolens_core::config::EngineConfig;
use agrolens_core::engine;
use agrolens_core::error::ErrorKind;
use agrolens_core::forecast::features::{date_features, FEATURE_NAMES};
use agrolens_core::forecast::gbrt::GradientBoostedTrees;
use agrolens_core::forecast::{forecast, ForecastConfig, MODEL_TYPE};
use agrolens_core::indices::VegetationIndex;
use agrolens_core::progress::EngineStage;
use agrolens_core::timeseries::Provenance;
use common::{daily_points, date, RecordingReporter};

fn ramp(n: usize, from: f64, to: f64) -> Vec<f64> {
    (0..n)
        .map(|i| from + (to - from) * i as f64 / (n - 1) as f64)
        .collect()
}

// ---------------------------------------------------------------------------
// Input validation
// ---------------------------------------------------------------------------

#[test]
fn test_horizon_bounds_checked_first() {
    let short = daily_points(date(2024, 3, 1), &[0.5; 5]);
    for horizon in [0, 91] {
        let err = forecast(&short, VegetationIndex::Ndvi, horizon, &ForecastConfig::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter, "horizon {horizon}");
    }
}

#[test]
fn test_short_history_rejected() {
    let points = daily_points(date(2024, 3, 1), &[0.5; 8]);
    let err =
        forecast(&points, VegetationIndex::Ndvi, 30, &ForecastConfig::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientHistory);
    assert!(!err.kind().is_retryable());
}

#[test]
fn test_unordered_dates_rejected() {
    let mut points = daily_points(date(2024, 3, 1), &ramp(12, 0.3, 0.6));
    points.swap(3, 4);
    let err =
        forecast(&points, VegetationIndex::Ndvi, 7, &ForecastConfig::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);

    let mut dup = daily_points(date(2024, 3, 1), &ramp(12, 0.3, 0.6));
    dup[5].date = dup[4].date;
    let err = forecast(&dup, VegetationIndex::Ndvi, 7, &ForecastConfig::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);
}

#[test]
fn test_non_finite_value_rejected() {
    let mut points = daily_points(date(2024, 3, 1), &ramp(12, 0.3, 0.6));
    points[6].value = f64::NAN;
    let err =
        forecast(&points, VegetationIndex::Ndvi, 7, &ForecastConfig::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);
}

#[test]
fn test_invalid_model_config_rejected() {
    let points = daily_points(date(2024, 3, 1), &ramp(12, 0.3, 0.6));
    let config = ForecastConfig {
        learning_rate: 0.0,
        ..ForecastConfig::default()
    };
    let err = forecast(&points, VegetationIndex::Ndvi, 7, &config).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);
}

// ---------------------------------------------------------------------------
// Output shape
// ---------------------------------------------------------------------------

#[test]
fn test_forecast_appends_one_point_per_day() {
    let points = daily_points(date(2024, 3, 1), &ramp(15, 0.3, 0.6));
    let result = forecast(&points, VegetationIndex::Ndvi, 7, &ForecastConfig::default()).unwrap();

    assert_eq!(result.points.len(), 22);
    assert_eq!(&result.points[..15], &points[..]);
    let future: Vec<_> = result.forecast_points().collect();
    assert_eq!(future.len(), 7);
    assert_eq!(future[0].date, date(2024, 3, 16));
    assert_eq!(future[6].date, date(2024, 3, 22));
    for p in &future {
        assert_eq!(p.provenance, Provenance::Forecast);
        assert!(p.value.is_finite());
        assert!((-1.0..=1.0).contains(&p.value));
    }
}

#[test]
fn test_metadata_describes_model() {
    let points = daily_points(date(2024, 3, 1), &ramp(15, 0.3, 0.6));
    let result = forecast(&points, VegetationIndex::Evi, 30, &ForecastConfig::default()).unwrap();
    let meta = &result.metadata;
    assert_eq!(meta.model_type, MODEL_TYPE);
    assert_eq!(meta.training_point_count, 15);
    assert_eq!(meta.horizon_days, 30);
    assert_eq!(meta.n_estimators, 200);
    assert!((meta.learning_rate - 0.05).abs() < 1e-12);
    assert_eq!(meta.max_depth, 3);
    assert!(meta.training_rmse < 0.05);
    assert_eq!(result.index, VegetationIndex::Evi);
}

#[test]
fn test_constant_series_forecasts_constant() {
    let points = daily_points(date(2024, 6, 1), &[0.6; 20]);
    let result = forecast(&points, VegetationIndex::Ndvi, 10, &ForecastConfig::default()).unwrap();
    for p in result.forecast_points() {
        assert!((p.value - 0.6).abs() < 1e-9);
    }
    assert!(result.metadata.training_rmse < 1e-9);
}

#[test]
fn test_rising_series_forecast_follows_recent_level() {
    let points = daily_points(date(2024, 1, 1), &ramp(30, 0.2, 0.8));
    let result = forecast(&points, VegetationIndex::Ndvi, 7, &ForecastConfig::default()).unwrap();
    for p in result.forecast_points() {
        assert!(p.value > 0.6, "{} on {}", p.value, p.date);
        assert!(p.value < 0.85, "{} on {}", p.value, p.date);
    }
}

#[test]
fn test_forecast_is_deterministic() {
    let points = daily_points(date(2024, 4, 1), &ramp(20, 0.4, 0.2));
    let config = ForecastConfig {
        subsample: 0.7,
        ..ForecastConfig::default()
    };
    let a = forecast(&points, VegetationIndex::Ndvi, 14, &config).unwrap();
    let b = forecast(&points, VegetationIndex::Ndvi, 14, &config).unwrap();
    assert_eq!(a.points, b.points);
    assert_eq!(a.metadata, b.metadata);
}

#[test]
fn test_engine_forecast_uses_configured_model() {
    let points = daily_points(date(2024, 4, 1), &ramp(12, 0.4, 0.5));
    let mut config = EngineConfig::default();
    config.forecast.n_estimators = 25;
    let result = engine::forecast(&points, VegetationIndex::Ndvi, 3, &config).unwrap();
    assert_eq!(result.metadata.n_estimators, 25);
    assert_eq!(result.forecast_points().count(), 3);
}

#[test]
fn test_forecast_reports_training_and_each_day() {
    let points = daily_points(date(2024, 4, 1), &ramp(12, 0.4, 0.5));
    let reporter = RecordingReporter::default();
    let result =
        engine::forecast_reported(&points, VegetationIndex::Ndvi, 7, &EngineConfig::default(), &reporter)
            .unwrap();
    assert_eq!(result.forecast_points().count(), 7);
    assert_eq!(
        reporter.stages(),
        vec![EngineStage::TrainingModel, EngineStage::Forecasting]
    );
    assert_eq!(reporter.advance_count(), 7);
}

#[test]
fn test_rejected_forecast_reports_nothing() {
    let points = daily_points(date(2024, 4, 1), &[0.5; 4]);
    let reporter = RecordingReporter::default();
    engine::forecast_reported(&points, VegetationIndex::Ndvi, 7, &EngineConfig::default(), &reporter)
        .unwrap_err();
    assert!(reporter.stages().is_empty());
}

// ---------------------------------------------------------------------------
// Features and model
// ---------------------------------------------------------------------------

#[test]
fn test_date_features() {
    let origin = date(2024, 1, 1);
    let f = date_features(date(2024, 2, 10), origin);
    assert_eq!(FEATURE_NAMES.len(), f.len());
    assert_eq!(f[0], 40.0);
    assert!((f[1].powi(2) + f[2].powi(2) - 1.0).abs() < 1e-12);
    assert_eq!(f[3], 6.0);
    assert_eq!(f[4], 2.0);
}

#[test]
fn test_boosted_trees_learn_step() {
    let origin = date(2024, 5, 1);
    let x: Vec<_> = (0..20)
        .map(|d| date_features(origin + chrono::Duration::days(d), origin))
        .collect();
    let y: Vec<f64> = (0..20).map(|d| if d < 10 { 0.2 } else { 0.8 }).collect();
    let model = GradientBoostedTrees::fit(&x, &y, &ForecastConfig::default());

    assert_eq!(model.n_trees(), 200);
    assert!((model.predict(&x[2]) - 0.2).abs() < 0.01);
    assert!((model.predict(&x[17]) - 0.8).abs() < 0.01);
    assert!(model.rmse(&x, &y) < 0.01);
}
