//! Imagery collaborators.
//!
//! The engine never talks to a satellite provider directly. It asks an
//! [`ImageSource`] for one co-registered scene per field and date, and is
//! agnostic to whether that scene comes from a live archive or a generator.

pub mod synthetic;

use chrono::NaiveDate;
use geo_types::Polygon;

use crate::error::Result;
use crate::raster::Scene;

pub use synthetic::SyntheticSource;

/// Supplies band stacks, masks and geo-bounds for a field polygon.
///
/// Implementations are shared across the series worker pool, so they must
/// be `Send + Sync`. A date without usable imagery is reported as
/// `AgroError::Provider`, which the series assembler records as a skipped
/// date rather than a failure of the whole request.
pub trait ImageSource: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Scene covering `geometry` (lon/lat) on or near `date`.
    fn fetch(&self, geometry: &Polygon<f64>, date: NaiveDate) -> Result<Scene>;
}
