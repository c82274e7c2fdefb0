//! Repeated single-date analyses turned into a dated, gap-filled series.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use geo_types::Polygon;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{AgroError, Result};
use crate::indices::{compute_index, VegetationIndex};
use crate::progress::{EngineStage, ProgressReporter};
use crate::source::ImageSource;
use crate::stats::{aggregate, FieldStats};

use super::config::SeriesConfig;
use super::{Provenance, TimeSeriesPoint};

/// Shared flag that stops a series request from starting further fetches.
///
/// Fetches already in flight run to completion and their results are kept.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Why a candidate date produced no Historical point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// The image source had nothing for this date.
    NoImagery { message: String },
    /// The scene had no usable pixels inside the field.
    InsufficientData { message: String },
    /// Too much of the field was obscured.
    Cloudy { cloud_coverage_percent: f64 },
    /// The request was cancelled before this date was fetched.
    Cancelled,
    /// The scene was captured outside the requested window.
    OutsideWindow { capture_date: NaiveDate },
    /// An earlier candidate date already returned this capture.
    DuplicateCapture { capture_date: NaiveDate },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoImagery { message } => write!(f, "no imagery ({message})"),
            Self::InsufficientData { message } => write!(f, "insufficient data ({message})"),
            Self::Cloudy {
                cloud_coverage_percent,
            } => write!(f, "cloudy ({cloud_coverage_percent:.1}% coverage)"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::OutsideWindow { capture_date } => {
                write!(f, "captured {capture_date}, outside the window")
            }
            Self::DuplicateCapture { capture_date } => {
                write!(f, "duplicate of the {capture_date} capture")
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SkippedDate {
    pub date: NaiveDate,
    pub reason: SkipReason,
}

/// One usable single-date analysis.
#[derive(Clone, Debug)]
pub struct Observation {
    pub requested_date: NaiveDate,
    pub stats: FieldStats,
}

/// Raw outcome of fetching every candidate date.
#[derive(Clone, Debug, Default)]
pub struct FetchReport {
    /// Usable observations, in candidate-date order.
    pub observations: Vec<Observation>,
    pub skipped: Vec<SkippedDate>,
    /// True when at least one date was skipped because of cancellation.
    pub cancelled: bool,
}

/// Assembled series plus the dates that could not contribute.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SeriesOutcome {
    pub index: VegetationIndex,
    pub points: Vec<TimeSeriesPoint>,
    pub skipped: Vec<SkippedDate>,
    /// True when cancellation cut the request short.
    pub cancelled: bool,
}

impl SeriesOutcome {
    pub fn historical_count(&self) -> usize {
        self.points
            .iter()
            .filter(|p| p.provenance == Provenance::Historical)
            .count()
    }
}

enum DateOutcome {
    Observed(Observation),
    Skipped(SkippedDate),
}

fn skip(date: NaiveDate, reason: SkipReason) -> DateOutcome {
    DateOutcome::Skipped(SkippedDate { date, reason })
}

/// Fetch, index and aggregate one date. Recoverable per-date failures become
/// skips; anything else propagates.
fn observe_date(
    source: &dyn ImageSource,
    geometry: &Polygon<f64>,
    index: VegetationIndex,
    date: NaiveDate,
    config: &SeriesConfig,
) -> Result<DateOutcome> {
    let scene = match source.fetch(geometry, date) {
        Ok(scene) => scene,
        Err(AgroError::Provider { message, .. }) => {
            return Ok(skip(date, SkipReason::NoImagery { message }))
        }
        Err(AgroError::InsufficientData(message)) => {
            return Ok(skip(date, SkipReason::InsufficientData { message }))
        }
        Err(e) => return Err(e),
    };

    let raster = compute_index(&scene.bands, &scene.mask, index)?;
    let stats = match aggregate(&raster, &scene.mask, scene.pixel_area_m2, scene.capture_date) {
        Ok(stats) => stats,
        Err(AgroError::InsufficientData(message)) => {
            return Ok(skip(date, SkipReason::InsufficientData { message }))
        }
        Err(e) => return Err(e),
    };

    if stats.cloud_coverage_percent >= config.max_cloud_coverage_percent
        || stats.valid_pixels_percent < config.min_valid_pixels_percent
    {
        return Ok(skip(
            date,
            SkipReason::Cloudy {
                cloud_coverage_percent: stats.cloud_coverage_percent,
            },
        ));
    }

    Ok(DateOutcome::Observed(Observation {
        requested_date: date,
        stats,
    }))
}

/// Analyze candidate dates on a worker pool bounded by
/// `max_concurrent_fetches`.
///
/// With a `limit`, dates are fetched in order-preserving batches and fetching
/// stops once `limit` distinct capture dates have been observed, so cloudy or
/// missing dates do not count against it. Without one every date is fetched.
///
/// Per-date provider failures, empty scenes and cloudy dates are recorded as
/// skipped. A `DataError` (or any other non-recoverable error) aborts the
/// whole request.
#[allow(clippy::too_many_arguments)]
pub fn fetch_observations(
    source: &dyn ImageSource,
    geometry: &Polygon<f64>,
    index: VegetationIndex,
    dates: &[NaiveDate],
    limit: Option<usize>,
    config: &SeriesConfig,
    cancel: &CancelToken,
    progress: &dyn ProgressReporter,
) -> Result<FetchReport> {
    let workers = config.max_concurrent_fetches.max(1);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()?;

    info!(
        source = source.name(),
        %index,
        dates = dates.len(),
        ?limit,
        workers,
        "Fetching series observations"
    );
    progress.begin_stage(EngineStage::FetchingImagery, Some(dates.len()));
    let done = AtomicUsize::new(0);

    let mut outcomes: Vec<Result<DateOutcome>> = Vec::with_capacity(dates.len());
    let mut captures: BTreeSet<NaiveDate> = BTreeSet::new();
    let mut next = 0;
    while next < dates.len() {
        let batch_len = match limit {
            Some(limit) if captures.len() >= limit => break,
            Some(limit) => limit - captures.len(),
            None => dates.len(),
        };
        let batch = &dates[next..(next + batch_len).min(dates.len())];
        next += batch.len();

        let batch_outcomes: Vec<Result<DateOutcome>> = pool.install(|| {
            batch
                .par_iter()
                .map(|&date| {
                    if cancel.is_cancelled() {
                        return Ok(skip(date, SkipReason::Cancelled));
                    }
                    let outcome = observe_date(source, geometry, index, date, config);
                    progress.advance(done.fetch_add(1, Ordering::Relaxed) + 1);
                    outcome
                })
                .collect()
        });
        let failed = batch_outcomes.iter().any(|o| o.is_err());
        for outcome in &batch_outcomes {
            if let Ok(DateOutcome::Observed(obs)) = outcome {
                captures.insert(obs.stats.capture_date);
            }
        }
        outcomes.extend(batch_outcomes);
        if failed {
            break;
        }
    }
    progress.finish_stage();
    if next < dates.len() {
        debug!(
            fetched = next,
            remaining = dates.len() - next,
            "Observation limit reached"
        );
    }

    let mut report = FetchReport::default();
    for outcome in outcomes {
        match outcome? {
            DateOutcome::Observed(obs) => {
                debug!(
                    date = %obs.requested_date,
                    capture_date = %obs.stats.capture_date,
                    mean = obs.stats.mean_index,
                    "Observation"
                );
                report.observations.push(obs);
            }
            DateOutcome::Skipped(skipped) => {
                warn!(date = %skipped.date, reason = %skipped.reason, "Skipping date");
                report.cancelled |= skipped.reason == SkipReason::Cancelled;
                report.skipped.push(skipped);
            }
        }
    }
    Ok(report)
}

/// Historical points inside `[start, end]`, one per capture date (first
/// observation wins), ascending. Observations that cannot contribute come
/// back as skipped dates.
pub fn historical_points(
    observations: &[Observation],
    start: NaiveDate,
    end: NaiveDate,
) -> (Vec<TimeSeriesPoint>, Vec<SkippedDate>) {
    let mut points: Vec<TimeSeriesPoint> = Vec::with_capacity(observations.len());
    let mut rejected = Vec::new();
    for obs in observations {
        let capture_date = obs.stats.capture_date;
        let reason = if capture_date < start || capture_date > end {
            SkipReason::OutsideWindow { capture_date }
        } else if points.iter().any(|p| p.date == capture_date) {
            SkipReason::DuplicateCapture { capture_date }
        } else {
            points.push(TimeSeriesPoint {
                date: capture_date,
                value: obs.stats.mean_index,
                provenance: Provenance::Historical,
            });
            continue;
        };
        debug!(date = %obs.requested_date, %reason, "Observation not used");
        rejected.push(SkippedDate {
            date: obs.requested_date,
            reason,
        });
    }
    points.sort_by_key(|p| p.date);
    (points, rejected)
}

/// Fill every missing calendar day strictly between consecutive points by
/// linear interpolation. Nothing is added before the first or after the last
/// point.
pub fn fill_gaps(points: &[TimeSeriesPoint]) -> Vec<TimeSeriesPoint> {
    let mut out = Vec::with_capacity(points.len());
    for pair in points.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        out.push(a.clone());
        let span = (b.date - a.date).num_days();
        for day in 1..span {
            let t = day as f64 / span as f64;
            out.push(TimeSeriesPoint {
                date: a.date + Duration::days(day),
                value: a.value + (b.value - a.value) * t,
                provenance: Provenance::Interpolated,
            });
        }
    }
    if let Some(last) = points.last() {
        out.push(last.clone());
    }
    out
}

/// Turn a fetch report into a gap-filled series.
///
/// No Historical point is a `NoData` error, or `Cancelled` when cancellation
/// is the reason nothing arrived.
pub fn assemble(
    report: FetchReport,
    index: VegetationIndex,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<SeriesOutcome> {
    let (historical, rejected) = historical_points(&report.observations, start, end);
    let mut skipped = report.skipped;
    skipped.extend(rejected);
    skipped.sort_by_key(|s| s.date);

    if historical.is_empty() {
        if report.cancelled {
            return Err(AgroError::Cancelled);
        }
        return Err(AgroError::NoData {
            start,
            end,
            skipped: skipped.len(),
        });
    }

    let points = fill_gaps(&historical);
    info!(
        %index,
        historical = historical.len(),
        interpolated = points.len() - historical.len(),
        skipped = skipped.len(),
        cancelled = report.cancelled,
        "Series assembled"
    );
    Ok(SeriesOutcome {
        index,
        points,
        skipped,
        cancelled: report.cancelled,
    })
}
