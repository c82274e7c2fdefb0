use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_MAX_CLOUD_COVERAGE_PERCENT, DEFAULT_MAX_CONCURRENT_FETCHES, DEFAULT_MAX_SERIES_POINTS,
    DEFAULT_MIN_VALID_PIXELS_PERCENT,
};

/// Policy for turning per-date analyses into series observations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeriesConfig {
    /// Dates at or above this cloud coverage are skipped as cloudy.
    #[serde(default = "default_max_cloud_coverage_percent")]
    pub max_cloud_coverage_percent: f64,
    /// Dates with fewer clear in-field pixels than this are skipped as cloudy.
    #[serde(default = "default_min_valid_pixels_percent")]
    pub min_valid_pixels_percent: f64,
    /// ImageSource calls in flight at once.
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
    /// Candidate dates sampled by the automatic cadence.
    #[serde(default = "default_max_points")]
    pub max_points: usize,
}

fn default_max_cloud_coverage_percent() -> f64 {
    DEFAULT_MAX_CLOUD_COVERAGE_PERCENT
}
fn default_min_valid_pixels_percent() -> f64 {
    DEFAULT_MIN_VALID_PIXELS_PERCENT
}
fn default_max_concurrent_fetches() -> usize {
    DEFAULT_MAX_CONCURRENT_FETCHES
}
fn default_max_points() -> usize {
    DEFAULT_MAX_SERIES_POINTS
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self {
            max_cloud_coverage_percent: DEFAULT_MAX_CLOUD_COVERAGE_PERCENT,
            min_valid_pixels_percent: DEFAULT_MIN_VALID_PIXELS_PERCENT,
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
            max_points: DEFAULT_MAX_SERIES_POINTS,
        }
    }
}
