//! Engine-wide configuration, loadable from TOML.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AgroError, Result};
use crate::forecast::ForecastConfig;
use crate::timeseries::SeriesConfig;
use crate::zoning::ZoningConfig;

/// Every tunable policy of the engine. Missing sections and keys fall back
/// to their defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub series: SeriesConfig,
    #[serde(default)]
    pub zoning: ZoningConfig,
    #[serde(default)]
    pub forecast: ForecastConfig,
}

impl EngineConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        let s = &self.series;
        for (name, value) in [
            ("max_cloud_coverage_percent", s.max_cloud_coverage_percent),
            ("min_valid_pixels_percent", s.min_valid_pixels_percent),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(AgroError::InvalidParameter(format!(
                    "series.{name} must be within [0, 100], got {value}"
                )));
            }
        }
        if s.max_concurrent_fetches == 0 || s.max_points == 0 {
            return Err(AgroError::InvalidParameter(
                "series.max_concurrent_fetches and series.max_points must be at least 1".into(),
            ));
        }
        if self.zoning.max_iterations == 0 || !(self.zoning.tolerance >= 0.0) {
            return Err(AgroError::InvalidParameter(
                "zoning.max_iterations must be at least 1 and zoning.tolerance non-negative"
                    .into(),
            ));
        }
        self.forecast.validate()
    }
}
