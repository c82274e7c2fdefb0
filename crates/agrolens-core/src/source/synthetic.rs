//! Deterministic Sentinel-2-like scene generator.
//!
//! Produces a seasonal vegetation signal over a smooth spatial pattern with
//! per-pixel noise, clipped to realistic digital-number ranges, plus a Scene
//! Classification Layer sprinkled with cloud and shadow codes. The same
//! (seed, date) always yields the same scene.

use std::collections::{BTreeMap, BTreeSet};
use std::f64::consts::PI;

use chrono::{Datelike, NaiveDate};
use geo::{BoundingRect, Contains};
use geo_types::{Point, Polygon};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use tracing::debug;

use crate::consts::{
    DEFAULT_SYNTHETIC_CLOUD_FRACTION, DEFAULT_SYNTHETIC_GRID_SIZE, DEFAULT_SYNTHETIC_SEED,
    DEFAULT_SYNTHETIC_SHADOW_FRACTION, SENTINEL2_DN_SCALE,
};
use crate::error::{AgroError, Result};
use crate::raster::{Band, BandStack, GeoBounds, Scene, SceneMask};

use super::ImageSource;

/// Per-band generator: `base - pattern * span`, scaled by season, plus
/// Gaussian noise, clipped to `[lo, hi]` digital numbers.
struct BandModel {
    band: Band,
    base: f64,
    pattern_gain: f64,
    season_offset: f64,
    season_gain: f64,
    noise_sigma: f64,
    lo: f64,
    hi: f64,
}

#[rustfmt::skip]
const BAND_MODELS: [BandModel; 5] = [
    BandModel { band: Band::B04, base: 2500.0, pattern_gain: -1500.0, season_offset: 1.5, season_gain: -0.5, noise_sigma: 150.0, lo: 300.0, hi: 4000.0 },
    BandModel { band: Band::B02, base: 2200.0, pattern_gain: -1200.0, season_offset: 1.4, season_gain: -0.4, noise_sigma: 130.0, lo: 250.0, hi: 3500.0 },
    BandModel { band: Band::B03, base: 2300.0, pattern_gain: -1300.0, season_offset: 1.4, season_gain: -0.4, noise_sigma: 140.0, lo: 280.0, hi: 3600.0 },
    BandModel { band: Band::B11, base: 2000.0, pattern_gain: -1000.0, season_offset: 1.3, season_gain: -0.3, noise_sigma: 200.0, lo: 500.0, hi: 5000.0 },
    BandModel { band: Band::B12, base: 1800.0, pattern_gain: -900.0, season_offset: 1.3, season_gain: -0.3, noise_sigma: 190.0, lo: 450.0, hi: 4800.0 },
];

/// NIR grows with the season instead of shrinking.
const NIR_MODEL: BandModel = BandModel {
    band: Band::B08,
    base: 1000.0,
    pattern_gain: 2000.0,
    season_offset: 0.0,
    season_gain: 1.0,
    noise_sigma: 200.0,
    lo: 500.0,
    hi: 8000.0,
};

/// Spatial frequency of the field pattern, in pixels of a 512-pixel scene.
const PATTERN_WAVELENGTH: f64 = 50.0;

/// Built-in image source for demos and tests.
#[derive(Clone, Debug)]
pub struct SyntheticSource {
    seed: u64,
    grid_size: usize,
    cloud_fraction: f64,
    shadow_fraction: f64,
    unavailable: BTreeSet<NaiveDate>,
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self::new(DEFAULT_SYNTHETIC_SEED)
    }
}

impl SyntheticSource {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            grid_size: DEFAULT_SYNTHETIC_GRID_SIZE,
            cloud_fraction: DEFAULT_SYNTHETIC_CLOUD_FRACTION,
            shadow_fraction: DEFAULT_SYNTHETIC_SHADOW_FRACTION,
            unavailable: BTreeSet::new(),
        }
    }

    /// Scene edge length in pixels (the scene is square in pixel space).
    pub fn with_grid_size(mut self, grid_size: usize) -> Self {
        self.grid_size = grid_size.max(1);
        self
    }

    /// Share of pixels flagged as cloud, in [0, 1].
    pub fn with_cloud_fraction(mut self, fraction: f64) -> Self {
        self.cloud_fraction = fraction.clamp(0.0, 1.0);
        self
    }

    /// Share of pixels flagged as cloud shadow, in [0, 1].
    pub fn with_shadow_fraction(mut self, fraction: f64) -> Self {
        self.shadow_fraction = fraction.clamp(0.0, 1.0);
        self
    }

    /// Dates for which `fetch` reports that no imagery exists.
    pub fn without_imagery_on<I: IntoIterator<Item = NaiveDate>>(mut self, dates: I) -> Self {
        self.unavailable.extend(dates);
        self
    }

    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    fn rng_for(&self, date: NaiveDate) -> StdRng {
        let day = date.num_days_from_ce() as u64;
        StdRng::seed_from_u64(self.seed ^ day.wrapping_mul(0x9E37_79B9_7F4A_7C15))
    }

    /// Digital numbers for all six bands plus the SCL layer.
    fn generate(
        &self,
        rng: &mut StdRng,
        season: f64,
    ) -> (BTreeMap<Band, Array2<u16>>, Array2<u8>) {
        let n = self.grid_size;
        let scale = 512.0 / n as f64;

        let mut pattern = Array2::<f64>::from_shape_fn((n, n), |(y, x)| {
            (x as f64 * scale / PATTERN_WAVELENGTH).sin()
                * (y as f64 * scale / PATTERN_WAVELENGTH).cos()
        });
        pattern.mapv_inplace(|v| v + rng.sample::<f64, _>(StandardNormal) * 0.3);
        let min = pattern.iter().copied().fold(f64::INFINITY, f64::min);
        let max = pattern.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let span = (max - min).max(f64::EPSILON);
        pattern.mapv_inplace(|v| (v - min) / span);

        let mut bands = BTreeMap::new();
        for model in std::iter::once(&NIR_MODEL).chain(BAND_MODELS.iter()) {
            let factor = model.season_offset + model.season_gain * season;
            let dn = pattern.mapv(|p| {
                let base = model.base + p * model.pattern_gain;
                let noise: f64 = rng.sample(StandardNormal);
                (base * factor + noise * model.noise_sigma).clamp(model.lo, model.hi) as u16
            });
            bands.insert(model.band, dn);
        }

        let mut scl = Array2::<u8>::from_elem((n, n), 4);
        for code in scl.iter_mut() {
            if rng.gen::<f64>() < self.cloud_fraction {
                *code = if rng.gen_bool(0.5) { 8 } else { 9 };
            }
        }
        for code in scl.iter_mut() {
            if rng.gen::<f64>() < self.shadow_fraction {
                *code = 3;
            }
        }
        (bands, scl)
    }
}

/// Seasonal vegetation vigor peaking in early summer, jittered by ±0.1 and
/// clamped to [0.2, 1.0].
pub fn seasonal_factor(date: NaiveDate, rng: &mut StdRng) -> f64 {
    let doy = date.ordinal() as f64;
    let base = 0.5 + 0.5 * ((doy - 80.0) * 2.0 * PI / 365.0).sin();
    (base + rng.gen_range(-0.1..0.1)).clamp(0.2, 1.0)
}

/// Bounding box of the polygon, gridded to `n` x `n` pixels.
fn bounds_for(geometry: &Polygon<f64>, n: usize) -> Result<GeoBounds> {
    let rect = geometry
        .bounding_rect()
        .ok_or_else(|| AgroError::InvalidParameter("field polygon is empty".into()))?;
    if rect.width() <= 0.0 || rect.height() <= 0.0 {
        return Err(AgroError::InvalidParameter(
            "field polygon has zero extent".into(),
        ));
    }
    Ok(GeoBounds {
        west: rect.min().x,
        south: rect.min().y,
        east: rect.max().x,
        north: rect.max().y,
        width: n,
        height: n,
    })
}

/// Pixels whose centre falls inside the polygon.
pub fn rasterize_footprint(geometry: &Polygon<f64>, bounds: &GeoBounds) -> Array2<bool> {
    Array2::from_shape_fn((bounds.height, bounds.width), |(row, col)| {
        let (lon, lat) = bounds.pixel_center(row, col);
        geometry.contains(&Point::new(lon, lat))
    })
}

impl ImageSource for SyntheticSource {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(&self, geometry: &Polygon<f64>, date: NaiveDate) -> Result<Scene> {
        if self.unavailable.contains(&date) {
            return Err(AgroError::Provider {
                date,
                message: "no imagery available".into(),
            });
        }
        let bounds = bounds_for(geometry, self.grid_size)?;
        let mut rng = self.rng_for(date);
        let season = seasonal_factor(date, &mut rng);
        debug!(%date, season, grid = self.grid_size, "Generating synthetic scene");

        let (dn, scl) = self.generate(&mut rng, season);
        let footprint = rasterize_footprint(geometry, &bounds);
        let mask = SceneMask::from_scl(&scl, &footprint)?;
        let bands = BandStack::from_digital_numbers(dn, SENTINEL2_DN_SCALE)?;
        Scene::new(date, bands, mask, bounds)
    }
}
