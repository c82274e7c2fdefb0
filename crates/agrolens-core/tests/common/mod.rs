#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use agrolens_core::error::{AgroError, Result};
use agrolens_core::indices::VegetationIndex;
use agrolens_core::progress::{EngineStage, ProgressReporter};
use agrolens_core::raster::{Band, BandStack, GeoBounds, IndexRaster, Scene, SceneMask};
use agrolens_core::source::ImageSource;
use agrolens_core::timeseries::{Provenance, TimeSeriesPoint};
use chrono::NaiveDate;
use geo_types::{LineString, Polygon};
use ndarray::Array2;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Stack with the same reflectance everywhere for each listed band.
pub fn uniform_stack(h: usize, w: usize, bands: &[(Band, f32)]) -> BandStack {
    let map: BTreeMap<Band, Array2<f32>> = bands
        .iter()
        .map(|&(b, v)| (b, Array2::from_elem((h, w), v)))
        .collect();
    BandStack::new(map).unwrap()
}

/// Red/NIR stack from explicit arrays.
pub fn red_nir_stack(red: Array2<f32>, nir: Array2<f32>) -> BandStack {
    let mut map = BTreeMap::new();
    map.insert(Band::B04, red);
    map.insert(Band::B08, nir);
    BandStack::new(map).unwrap()
}

/// NIR reflectance that yields exactly `ndvi` with red = 0.1.
pub fn nir_for_ndvi(ndvi: f32) -> f32 {
    0.1 * (1.0 + ndvi) / (1.0 - ndvi)
}

/// Index raster where every finite value is valid.
pub fn raster_from_values(index: VegetationIndex, values: Array2<f32>) -> IndexRaster {
    let valid = values.mapv(|v| v.is_finite());
    IndexRaster {
        index,
        values,
        valid,
    }
}

/// Small grid near the equator, 1e-4 degrees per pixel.
pub fn test_bounds(h: usize, w: usize) -> GeoBounds {
    GeoBounds {
        west: 30.0,
        south: 0.0,
        east: 30.0 + w as f64 * 1e-4,
        north: h as f64 * 1e-4,
        width: w,
        height: h,
    }
}

/// Axis-aligned square field polygon.
pub fn square_field(west: f64, south: f64, size: f64) -> Polygon<f64> {
    Polygon::new(
        LineString::from(vec![
            (west, south),
            (west + size, south),
            (west + size, south + size),
            (west, south + size),
            (west, south),
        ]),
        vec![],
    )
}

/// Points at consecutive days starting at `start`, all Historical.
pub fn daily_points(start: NaiveDate, values: &[f64]) -> Vec<TimeSeriesPoint> {
    values
        .iter()
        .enumerate()
        .map(|(i, &value)| TimeSeriesPoint {
            date: start + chrono::Duration::days(i as i64),
            value,
            provenance: Provenance::Historical,
        })
        .collect()
}

/// Image source returning a uniform NDVI field per date.
///
/// Dates without an entry fail with a provider error. `capture` remaps a
/// requested date to a different acquisition date.
pub struct FixedSource {
    pub size: usize,
    pub ndvi: HashMap<NaiveDate, f32>,
    pub capture: HashMap<NaiveDate, NaiveDate>,
    pub cloudy: HashMap<NaiveDate, f32>,
    pub broken: Vec<NaiveDate>,
    pub calls: Mutex<Vec<NaiveDate>>,
    pub on_fetch: Option<Box<dyn Fn(NaiveDate) + Send + Sync>>,
}

impl FixedSource {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            ndvi: HashMap::new(),
            capture: HashMap::new(),
            cloudy: HashMap::new(),
            broken: Vec::new(),
            calls: Mutex::new(Vec::new()),
            on_fetch: None,
        }
    }

    pub fn with(mut self, d: NaiveDate, ndvi: f32) -> Self {
        self.ndvi.insert(d, ndvi);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl ImageSource for FixedSource {
    fn name(&self) -> &str {
        "fixed"
    }

    fn fetch(&self, _geometry: &Polygon<f64>, date: NaiveDate) -> Result<Scene> {
        self.calls.lock().unwrap().push(date);
        if let Some(ref hook) = self.on_fetch {
            hook(date);
        }
        if self.broken.contains(&date) {
            return Err(AgroError::Data("corrupt band payload".into()));
        }
        let ndvi = *self.ndvi.get(&date).ok_or(AgroError::Provider {
            date,
            message: "no imagery".into(),
        })?;
        let n = self.size;
        let stack = uniform_stack(n, n, &[(Band::B04, 0.1), (Band::B08, nir_for_ndvi(ndvi))]);

        // The first `cloud_share` of rows are cloud.
        let cloud_share = self.cloudy.get(&date).copied().unwrap_or(0.0);
        let cloud_rows = (cloud_share * n as f32).round() as usize;
        let footprint = Array2::from_elem((n, n), true);
        let cloudy = Array2::from_shape_fn((n, n), |(r, _)| r < cloud_rows);
        let mask = SceneMask::from_flags(&footprint, &cloudy)?;

        let capture = self.capture.get(&date).copied().unwrap_or(date);
        Scene::new(capture, stack, mask, test_bounds(n, n))
    }
}

/// Reporter that records stages and counts advances.
#[derive(Default)]
pub struct RecordingReporter {
    pub stages: Mutex<Vec<EngineStage>>,
    pub advances: AtomicUsize,
}

impl RecordingReporter {
    pub fn stages(&self) -> Vec<EngineStage> {
        self.stages.lock().unwrap().clone()
    }

    pub fn advance_count(&self) -> usize {
        self.advances.load(Ordering::Relaxed)
    }
}

impl ProgressReporter for RecordingReporter {
    fn begin_stage(&self, stage: EngineStage, _total: Option<usize>) {
        self.stages.lock().unwrap().push(stage);
    }

    fn advance(&self, _completed: usize) {
        self.advances.fetch_add(1, Ordering::Relaxed);
    }
}
