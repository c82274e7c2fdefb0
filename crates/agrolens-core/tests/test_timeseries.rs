mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use agrolens_core::config::EngineConfig;
use agrolens_core::engine::{series, series_reported};
use agrolens_core::error::{AgroError, ErrorKind};
use agrolens_core::indices::VegetationIndex;
use agrolens_core::progress::EngineStage;
use agrolens_core::timeseries::{
    auto_interval_days, candidate_dates, fill_gaps, CancelToken, Cadence, Provenance, SkipReason,
};
use chrono::NaiveDate;
use common::{daily_points, date, square_field, FixedSource, RecordingReporter};

fn field() -> geo_types::Polygon<f64> {
    square_field(30.0, 0.0, 0.001)
}

/// Jan 1, 6, 11, 16, 21 of 2024 at a five-day cadence.
fn five_day_source() -> FixedSource {
    FixedSource::new(10)
        .with(date(2024, 1, 1), 0.3)
        .with(date(2024, 1, 6), 0.4)
        .with(date(2024, 1, 11), 0.5)
        .with(date(2024, 1, 16), 0.6)
        .with(date(2024, 1, 21), 0.7)
}

/// 300 days from Jan 1 2024: the automatic cadence steps 30 days, giving
/// eleven candidates for the default ten points.
fn auto_window() -> (NaiveDate, NaiveDate) {
    (date(2024, 1, 1), date(2024, 10, 27))
}

fn auto_source() -> FixedSource {
    let (start, end) = auto_window();
    candidate_dates(start, end, Cadence::Auto, 10)
        .unwrap()
        .into_iter()
        .fold(FixedSource::new(10), |source, d| source.with(d, 0.5))
}

fn run_auto(source: &FixedSource) -> agrolens_core::timeseries::SeriesOutcome {
    let (start, end) = auto_window();
    series(
        source,
        &field(),
        VegetationIndex::Ndvi,
        start,
        end,
        Cadence::Auto,
        &CancelToken::new(),
        &EngineConfig::default(),
    )
    .unwrap()
}

fn run(source: &FixedSource) -> agrolens_core::error::Result<agrolens_core::timeseries::SeriesOutcome> {
    series(
        source,
        &field(),
        VegetationIndex::Ndvi,
        date(2024, 1, 1),
        date(2024, 1, 21),
        Cadence::Days(5),
        &CancelToken::new(),
        &EngineConfig::default(),
    )
}

// ---------------------------------------------------------------------------
// Candidate dates
// ---------------------------------------------------------------------------

#[test]
fn test_auto_interval_floors_by_span() {
    assert_eq!(auto_interval_days(20, 10), 7);
    assert_eq!(auto_interval_days(60, 10), 14);
    assert_eq!(auto_interval_days(150, 10), 21);
    assert_eq!(auto_interval_days(200, 10), 30);
    assert_eq!(auto_interval_days(365, 10), 36);
}

#[test]
fn test_auto_cadence_covers_whole_window() {
    let dates = candidate_dates(date(2024, 1, 1), date(2024, 12, 31), Cadence::Auto, 10).unwrap();
    // 365-day span at 36 days: candidates run to Dec 26, past max_points.
    assert_eq!(dates.len(), 11);
    assert_eq!(dates[0], date(2024, 1, 1));
    assert_eq!(dates[10], date(2024, 12, 26));
    assert!(dates.windows(2).all(|w| (w[1] - w[0]).num_days() == 36));
}

#[test]
fn test_observation_limit_only_for_auto() {
    assert_eq!(Cadence::Auto.observation_limit(10), Some(10));
    assert_eq!(Cadence::Auto.observation_limit(0), Some(1));
    assert_eq!(Cadence::Days(5).observation_limit(10), None);
}

#[test]
fn test_fixed_cadence_includes_end() {
    let dates =
        candidate_dates(date(2024, 1, 1), date(2024, 1, 21), Cadence::Days(5), 10).unwrap();
    assert_eq!(dates.len(), 5);
    assert_eq!(dates[4], date(2024, 1, 21));
}

#[test]
fn test_single_day_window() {
    let d = date(2024, 5, 5);
    assert_eq!(candidate_dates(d, d, Cadence::Auto, 10).unwrap(), vec![d]);
}

#[test]
fn test_candidate_date_errors() {
    let err = candidate_dates(date(2024, 2, 1), date(2024, 1, 1), Cadence::Auto, 10).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    let err =
        candidate_dates(date(2024, 1, 1), date(2024, 2, 1), Cadence::Days(0), 10).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);
}

#[test]
fn test_cadence_parse_and_display() {
    assert_eq!("auto".parse::<Cadence>().unwrap(), Cadence::Auto);
    assert_eq!("10d".parse::<Cadence>().unwrap(), Cadence::Days(10));
    assert_eq!("14".parse::<Cadence>().unwrap(), Cadence::Days(14));
    assert!("weekly".parse::<Cadence>().is_err());
    assert_eq!(Cadence::Days(7).to_string(), "7d");
    assert_eq!(Cadence::Auto.to_string(), "auto");
}

// ---------------------------------------------------------------------------
// Gap filling
// ---------------------------------------------------------------------------

#[test]
fn test_fill_gaps_linear() {
    let mut points = daily_points(date(2024, 1, 1), &[0.3]);
    points.extend(daily_points(date(2024, 1, 10), &[0.5]));
    let filled = fill_gaps(&points);

    assert_eq!(filled.len(), 10);
    let day5 = filled.iter().find(|p| p.date == date(2024, 1, 5)).unwrap();
    assert_eq!(day5.provenance, Provenance::Interpolated);
    assert!((day5.value - (0.3 + 0.2 * 4.0 / 9.0)).abs() < 1e-12);
    assert_eq!(filled[0].provenance, Provenance::Historical);
    assert_eq!(filled[9].provenance, Provenance::Historical);
    assert_eq!(
        filled
            .iter()
            .filter(|p| p.provenance == Provenance::Interpolated)
            .count(),
        8
    );
}

#[test]
fn test_fill_gaps_adjacent_and_empty() {
    let points = daily_points(date(2024, 1, 1), &[0.1, 0.2, 0.3]);
    assert_eq!(fill_gaps(&points), points);
    assert!(fill_gaps(&[]).is_empty());
}

// ---------------------------------------------------------------------------
// Series assembly
// ---------------------------------------------------------------------------

#[test]
fn test_series_skips_missing_and_cloudy_dates() {
    let mut source = five_day_source();
    source.ndvi.remove(&date(2024, 1, 6));
    source.cloudy.insert(date(2024, 1, 16), 0.7);

    let outcome = run(&source).unwrap();
    assert_eq!(outcome.historical_count(), 3);
    assert_eq!(outcome.points.len(), 21);
    assert!(!outcome.cancelled);

    assert_eq!(outcome.skipped.len(), 2);
    let missing = outcome
        .skipped
        .iter()
        .find(|s| s.date == date(2024, 1, 6))
        .unwrap();
    assert!(matches!(missing.reason, SkipReason::NoImagery { .. }));
    let cloudy = outcome
        .skipped
        .iter()
        .find(|s| s.date == date(2024, 1, 16))
        .unwrap();
    match cloudy.reason {
        SkipReason::Cloudy {
            cloud_coverage_percent,
        } => assert!((cloud_coverage_percent - 70.0).abs() < 1e-9),
        ref other => panic!("expected cloudy skip, got {other:?}"),
    }

    let jan11 = outcome
        .points
        .iter()
        .find(|p| p.date == date(2024, 1, 11))
        .unwrap();
    assert_eq!(jan11.provenance, Provenance::Historical);
    assert!((jan11.value - 0.5).abs() < 1e-4);
}

#[test]
fn test_series_points_ascending_and_contiguous() {
    let outcome = run(&five_day_source()).unwrap();
    assert_eq!(outcome.historical_count(), 5);
    for pair in outcome.points.windows(2) {
        assert_eq!((pair[1].date - pair[0].date).num_days(), 1);
    }
    for p in &outcome.points {
        assert!(p.value > 0.29 && p.value < 0.71, "{} at {}", p.value, p.date);
    }
}

#[test]
fn test_series_dedups_on_capture_date() {
    let mut source = five_day_source();
    // Jan 6 resolves to the Jan 1 acquisition; the first observation wins.
    source.capture.insert(date(2024, 1, 6), date(2024, 1, 1));
    source.ndvi.insert(date(2024, 1, 6), 0.9);

    let outcome = run(&source).unwrap();
    assert_eq!(outcome.historical_count(), 4);
    let jan1 = &outcome.points[0];
    assert_eq!(jan1.date, date(2024, 1, 1));
    assert!((jan1.value - 0.3).abs() < 1e-4);

    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].date, date(2024, 1, 6));
    assert_eq!(
        outcome.skipped[0].reason,
        SkipReason::DuplicateCapture {
            capture_date: date(2024, 1, 1)
        }
    );
}

#[test]
fn test_series_drops_captures_outside_window() {
    let mut source = five_day_source();
    source.capture.insert(date(2024, 1, 21), date(2024, 1, 25));

    let outcome = run(&source).unwrap();
    assert_eq!(outcome.historical_count(), 4);
    assert_eq!(outcome.points.last().unwrap().date, date(2024, 1, 16));

    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].date, date(2024, 1, 21));
    assert_eq!(
        outcome.skipped[0].reason,
        SkipReason::OutsideWindow {
            capture_date: date(2024, 1, 25)
        }
    );
}

#[test]
fn test_unusable_captures_count_toward_no_data() {
    let mut source = FixedSource::new(10).with(date(2024, 1, 11), 0.5);
    source.capture.insert(date(2024, 1, 11), date(2023, 12, 30));
    match run(&source).unwrap_err() {
        AgroError::NoData { skipped, .. } => assert_eq!(skipped, 5),
        other => panic!("expected NoData, got {other:?}"),
    }
}

#[test]
fn test_auto_series_stops_at_max_points() {
    let source = auto_source();
    let outcome = run_auto(&source);
    assert_eq!(outcome.historical_count(), 10);
    assert!(outcome.skipped.is_empty());
    // The eleventh candidate is never fetched.
    assert_eq!(source.call_count(), 10);
    assert_eq!(outcome.points.last().unwrap().date, date(2024, 9, 27));
}

#[test]
fn test_auto_series_steps_past_cloudy_dates() {
    let mut source = auto_source();
    source.cloudy.insert(date(2024, 1, 1), 0.7);
    let outcome = run_auto(&source);

    assert_eq!(outcome.historical_count(), 10);
    assert_eq!(outcome.skipped.len(), 1);
    assert!(matches!(outcome.skipped[0].reason, SkipReason::Cloudy { .. }));
    assert_eq!(source.call_count(), 11);
    assert_eq!(outcome.points[0].date, date(2024, 1, 31));
    assert_eq!(outcome.points.last().unwrap().date, date(2024, 10, 27));
}

#[test]
fn test_fixed_cadence_fetches_every_date() {
    let mut source = five_day_source();
    source.cloudy.insert(date(2024, 1, 1), 0.7);
    let mut config = EngineConfig::default();
    config.series.max_points = 2;
    let outcome = series(
        &source,
        &field(),
        VegetationIndex::Ndvi,
        date(2024, 1, 1),
        date(2024, 1, 21),
        Cadence::Days(5),
        &CancelToken::new(),
        &config,
    )
    .unwrap();
    assert_eq!(source.call_count(), 5);
    assert_eq!(outcome.historical_count(), 4);
}

#[test]
fn test_series_data_error_aborts() {
    let mut source = five_day_source();
    source.broken.push(date(2024, 1, 11));
    let err = run(&source).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DataError);
}

#[test]
fn test_series_without_observations_is_no_data() {
    let source = FixedSource::new(10);
    let err = run(&source).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoData);
    assert!(!err.kind().is_retryable());
}

#[test]
fn test_cancel_before_start() {
    let source = five_day_source();
    let cancel = CancelToken::new();
    cancel.cancel();
    let err = series(
        &source,
        &field(),
        VegetationIndex::Ndvi,
        date(2024, 1, 1),
        date(2024, 1, 21),
        Cadence::Days(5),
        &cancel,
        &EngineConfig::default(),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert_eq!(source.call_count(), 0);
}

#[test]
fn test_cancel_mid_request_keeps_completed_points() {
    let cancel = CancelToken::new();
    let mut source = five_day_source();
    let hook_token = cancel.clone();
    source.on_fetch = Some(Box::new(move |_| hook_token.cancel()));

    let mut config = EngineConfig::default();
    config.series.max_concurrent_fetches = 1;

    let outcome = series(
        &source,
        &field(),
        VegetationIndex::Ndvi,
        date(2024, 1, 1),
        date(2024, 1, 21),
        Cadence::Days(5),
        &cancel,
        &config,
    )
    .unwrap();

    assert!(outcome.cancelled);
    assert_eq!(source.call_count(), 1);
    assert_eq!(outcome.historical_count(), 1);
    let cancelled = outcome
        .skipped
        .iter()
        .filter(|s| s.reason == SkipReason::Cancelled)
        .count();
    assert_eq!(cancelled, 4);
}

#[test]
fn test_cancel_after_last_fetch_is_not_cancelled() {
    let cancel = CancelToken::new();
    let mut source = five_day_source();
    let hook_token = cancel.clone();
    let fetched = Arc::new(AtomicUsize::new(0));
    let hook_count = Arc::clone(&fetched);
    source.on_fetch = Some(Box::new(move |_| {
        if hook_count.fetch_add(1, Ordering::SeqCst) + 1 == 5 {
            hook_token.cancel();
        }
    }));

    let outcome = series(
        &source,
        &field(),
        VegetationIndex::Ndvi,
        date(2024, 1, 1),
        date(2024, 1, 21),
        Cadence::Days(5),
        &cancel,
        &EngineConfig::default(),
    )
    .unwrap();

    assert!(cancel.is_cancelled());
    assert!(!outcome.cancelled);
    assert_eq!(outcome.historical_count(), 5);
    assert!(outcome.skipped.is_empty());
}

#[test]
fn test_series_reports_progress_per_date() {
    let reporter = RecordingReporter::default();
    series_reported(
        &five_day_source(),
        &field(),
        VegetationIndex::Ndvi,
        date(2024, 1, 1),
        date(2024, 1, 21),
        Cadence::Days(5),
        &CancelToken::new(),
        &EngineConfig::default(),
        &reporter,
    )
    .unwrap();

    assert_eq!(reporter.advance_count(), 5);
    let stages = reporter.stages();
    assert_eq!(stages[0], EngineStage::FetchingImagery);
    assert!(stages.contains(&EngineStage::AssemblingSeries));
}

#[test]
fn test_skip_reason_json() {
    let json = serde_json::to_value(SkipReason::Cloudy {
        cloud_coverage_percent: 70.0,
    })
    .unwrap();
    assert_eq!(json["kind"], "cloudy");
    assert_eq!(json["cloud_coverage_percent"], 70.0);

    let json = serde_json::to_value(SkipReason::DuplicateCapture {
        capture_date: date(2024, 1, 1),
    })
    .unwrap();
    assert_eq!(json["kind"], "duplicate_capture");
    assert_eq!(json["capture_date"], "2024-01-01");
}
