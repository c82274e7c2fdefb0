use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_KMEANS_MAX_ITERATIONS, DEFAULT_KMEANS_TOLERANCE, DEFAULT_MIN_POLYGON_PIXELS,
};

/// Clustering and vectorization parameters for management zones.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZoningConfig {
    /// Upper bound on Lloyd iterations.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// Stop when no centroid moves more than this.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Connected pixel islands smaller than this are left out of the polygon
    /// features. They still count towards zone statistics.
    #[serde(default = "default_min_polygon_pixels")]
    pub min_polygon_pixels: usize,
}

fn default_max_iterations() -> usize {
    DEFAULT_KMEANS_MAX_ITERATIONS
}
fn default_tolerance() -> f64 {
    DEFAULT_KMEANS_TOLERANCE
}
fn default_min_polygon_pixels() -> usize {
    DEFAULT_MIN_POLYGON_PIXELS
}

impl Default for ZoningConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_KMEANS_MAX_ITERATIONS,
            tolerance: DEFAULT_KMEANS_TOLERANCE,
            min_polygon_pixels: DEFAULT_MIN_POLYGON_PIXELS,
        }
    }
}
