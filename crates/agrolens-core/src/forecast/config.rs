use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_GBRT_ESTIMATORS, DEFAULT_GBRT_LEARNING_RATE, DEFAULT_GBRT_MAX_DEPTH,
    DEFAULT_GBRT_MIN_SAMPLES_LEAF, DEFAULT_GBRT_SEED, DEFAULT_GBRT_SUBSAMPLE,
};
use crate::error::{AgroError, Result};

/// Gradient-boosted regression tree hyperparameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForecastConfig {
    #[serde(default = "default_n_estimators")]
    pub n_estimators: usize,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    #[serde(default = "default_min_samples_leaf")]
    pub min_samples_leaf: usize,
    /// Fraction of rows drawn (without replacement) for each stage.
    #[serde(default = "default_subsample")]
    pub subsample: f64,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_n_estimators() -> usize {
    DEFAULT_GBRT_ESTIMATORS
}
fn default_learning_rate() -> f64 {
    DEFAULT_GBRT_LEARNING_RATE
}
fn default_max_depth() -> usize {
    DEFAULT_GBRT_MAX_DEPTH
}
fn default_min_samples_leaf() -> usize {
    DEFAULT_GBRT_MIN_SAMPLES_LEAF
}
fn default_subsample() -> f64 {
    DEFAULT_GBRT_SUBSAMPLE
}
fn default_seed() -> u64 {
    DEFAULT_GBRT_SEED
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            n_estimators: DEFAULT_GBRT_ESTIMATORS,
            learning_rate: DEFAULT_GBRT_LEARNING_RATE,
            max_depth: DEFAULT_GBRT_MAX_DEPTH,
            min_samples_leaf: DEFAULT_GBRT_MIN_SAMPLES_LEAF,
            subsample: DEFAULT_GBRT_SUBSAMPLE,
            seed: DEFAULT_GBRT_SEED,
        }
    }
}

impl ForecastConfig {
    pub fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(AgroError::InvalidParameter(
                "n_estimators must be at least 1".into(),
            ));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(AgroError::InvalidParameter(format!(
                "learning_rate must be in (0, 1], got {}",
                self.learning_rate
            )));
        }
        if self.max_depth == 0 || self.min_samples_leaf == 0 {
            return Err(AgroError::InvalidParameter(
                "max_depth and min_samples_leaf must be at least 1".into(),
            ));
        }
        if !(self.subsample > 0.0 && self.subsample <= 1.0) {
            return Err(AgroError::InvalidParameter(format!(
                "subsample must be in (0, 1], got {}",
                self.subsample
            )));
        }
        Ok(())
    }
}
