//! Time-series assembly: candidate dates, concurrent per-date analysis,
//! deduplication and gap interpolation.

pub mod assembler;
pub mod cadence;
pub mod config;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use assembler::{
    assemble, fetch_observations, fill_gaps, historical_points, CancelToken, FetchReport,
    Observation, SeriesOutcome, SkipReason, SkippedDate,
};
pub use cadence::{auto_interval_days, candidate_dates, Cadence};
pub use config::SeriesConfig;

/// How a series value was obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Measured from imagery.
    Historical,
    /// Linearly interpolated between two Historical points.
    Interpolated,
    /// Predicted beyond the last input point.
    Forecast,
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Historical => write!(f, "historical"),
            Self::Interpolated => write!(f, "interpolated"),
            Self::Forecast => write!(f, "forecast"),
        }
    }
}

/// One dated index value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
    pub provenance: Provenance,
}
