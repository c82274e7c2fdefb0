use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::NaiveDate;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::consts::EARTH_RADIUS_M;
use crate::error::{AgroError, Result};
use crate::indices::VegetationIndex;

/// Sentinel-2 L2A reflectance bands understood by the index formulas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Band {
    /// Blue, 490 nm.
    B02,
    /// Green, 560 nm.
    B03,
    /// Red, 665 nm.
    B04,
    /// Near infrared, 842 nm.
    B08,
    /// Shortwave infrared 1, 1610 nm.
    B11,
    /// Shortwave infrared 2, 2190 nm.
    B12,
}

impl Band {
    pub const ALL: [Band; 6] = [
        Self::B02,
        Self::B03,
        Self::B04,
        Self::B08,
        Self::B11,
        Self::B12,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Self::B02 => "B02",
            Self::B03 => "B03",
            Self::B04 => "B04",
            Self::B08 => "B08",
            Self::B11 => "B11",
            Self::B12 => "B12",
        }
    }

    /// Common spectral name ("red", "nir", ...).
    pub fn common_name(self) -> &'static str {
        match self {
            Self::B02 => "blue",
            Self::B03 => "green",
            Self::B04 => "red",
            Self::B08 => "nir",
            Self::B11 => "swir1",
            Self::B12 => "swir2",
        }
    }
}

impl std::fmt::Display for Band {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Band {
    type Err = AgroError;

    fn from_str(s: &str) -> Result<Self> {
        let upper = s.trim().to_ascii_uppercase();
        Band::ALL
            .iter()
            .copied()
            .find(|b| b.code() == upper || b.common_name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AgroError::Data(format!("unknown band '{s}'")))
    }
}

/// Co-registered reflectance bands for one scene.
///
/// Every band has the same (rows, cols) shape. Values are surface
/// reflectance, nominally in [0.0, 1.0].
#[derive(Clone, Debug)]
pub struct BandStack {
    bands: BTreeMap<Band, Array2<f32>>,
    shape: (usize, usize),
}

impl BandStack {
    pub fn new(bands: BTreeMap<Band, Array2<f32>>) -> Result<Self> {
        let shape = match bands.values().next() {
            Some(first) => first.dim(),
            None => return Err(AgroError::Data("band stack has no bands".into())),
        };
        if let Some((band, data)) = bands.iter().find(|(_, d)| d.dim() != shape) {
            return Err(AgroError::Data(format!(
                "band {band} has shape {:?}, expected {:?}",
                data.dim(),
                shape
            )));
        }
        Ok(Self { bands, shape })
    }

    /// Build a stack from integer digital numbers, dividing by `scale`.
    pub fn from_digital_numbers(dn: BTreeMap<Band, Array2<u16>>, scale: f32) -> Result<Self> {
        if scale <= 0.0 {
            return Err(AgroError::InvalidParameter(format!(
                "reflectance scale must be positive, got {scale}"
            )));
        }
        let bands = dn
            .into_iter()
            .map(|(band, data)| (band, data.mapv(|v| v as f32 / scale)))
            .collect();
        Self::new(bands)
    }

    /// Borrow a band; a missing band is a `DataError`, never substituted.
    pub fn band(&self, band: Band) -> Result<&Array2<f32>> {
        self.bands
            .get(&band)
            .ok_or_else(|| AgroError::Data(format!("required band {band} is absent")))
    }

    pub fn contains(&self, band: Band) -> bool {
        self.bands.contains_key(&band)
    }

    pub fn bands(&self) -> impl Iterator<Item = Band> + '_ {
        self.bands.keys().copied()
    }

    pub fn dim(&self) -> (usize, usize) {
        self.shape
    }
}

/// Per-pixel state carried through every stage of an analysis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelClass {
    /// Inside the field and clear.
    Valid,
    /// Inside the field but cloud, shadow, saturated or no-data.
    Cloud,
    /// Outside the field polygon.
    #[default]
    Outside,
}

/// Scene Classification Layer codes that denote a usable surface.
pub const SCL_CLEAR_CODES: [u8; 5] = [4, 5, 6, 7, 11];

/// Tri-state mask co-registered with a `BandStack`.
#[derive(Clone, Debug)]
pub struct SceneMask {
    pub classes: Array2<PixelClass>,
}

/// Pixel counts per `PixelClass`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClassCounts {
    pub valid: usize,
    pub cloud: usize,
    pub outside: usize,
}

impl ClassCounts {
    /// Pixels inside the field polygon.
    pub fn inside(&self) -> usize {
        self.valid + self.cloud
    }
}

impl SceneMask {
    pub fn new(classes: Array2<PixelClass>) -> Self {
        Self { classes }
    }

    /// Every pixel valid; useful for already-clipped rasters.
    pub fn all_valid(shape: (usize, usize)) -> Self {
        Self::new(Array2::from_elem(shape, PixelClass::Valid))
    }

    /// Combine a field footprint with a per-pixel cloud flag.
    pub fn from_flags(footprint: &Array2<bool>, cloudy: &Array2<bool>) -> Result<Self> {
        if footprint.dim() != cloudy.dim() {
            return Err(AgroError::Data(format!(
                "footprint {:?} and cloud mask {:?} are not co-registered",
                footprint.dim(),
                cloudy.dim()
            )));
        }
        let mut classes = Array2::from_elem(footprint.dim(), PixelClass::Outside);
        ndarray::Zip::from(&mut classes)
            .and(footprint)
            .and(cloudy)
            .for_each(|c, &inside, &cloud| {
                *c = match (inside, cloud) {
                    (false, _) => PixelClass::Outside,
                    (true, true) => PixelClass::Cloud,
                    (true, false) => PixelClass::Valid,
                };
            });
        Ok(Self::new(classes))
    }

    /// Classify a Sentinel-2 Scene Classification Layer within a footprint.
    pub fn from_scl(scl: &Array2<u8>, footprint: &Array2<bool>) -> Result<Self> {
        let cloudy = scl.mapv(|code| !SCL_CLEAR_CODES.contains(&code));
        Self::from_flags(footprint, &cloudy)
    }

    pub fn dim(&self) -> (usize, usize) {
        self.classes.dim()
    }

    pub fn is_valid(&self, row: usize, col: usize) -> bool {
        self.classes[[row, col]] == PixelClass::Valid
    }

    pub fn counts(&self) -> ClassCounts {
        let mut counts = ClassCounts::default();
        for class in self.classes.iter() {
            match class {
                PixelClass::Valid => counts.valid += 1,
                PixelClass::Cloud => counts.cloud += 1,
                PixelClass::Outside => counts.outside += 1,
            }
        }
        counts
    }
}

/// Stricter per-index validity produced by the index calculator.
pub type ValidityMask = Array2<bool>;

/// One vegetation index evaluated per pixel.
///
/// Invalid pixels hold NaN and `valid == false`.
#[derive(Clone, Debug)]
pub struct IndexRaster {
    pub index: VegetationIndex,
    pub values: Array2<f32>,
    pub valid: ValidityMask,
}

impl IndexRaster {
    pub fn dim(&self) -> (usize, usize) {
        self.values.dim()
    }

    pub fn valid_count(&self) -> usize {
        self.valid.iter().filter(|&&v| v).count()
    }

    /// Values of valid pixels, row-major.
    pub fn valid_values(&self) -> impl Iterator<Item = f32> + '_ {
        self.values
            .iter()
            .zip(self.valid.iter())
            .filter_map(|(&v, &ok)| ok.then_some(v))
    }
}

/// Geographic extent of a raster grid (EPSG:4326, north-up).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
    pub width: usize,
    pub height: usize,
}

impl GeoBounds {
    pub fn pixel_width_deg(&self) -> f64 {
        (self.east - self.west) / self.width.max(1) as f64
    }

    pub fn pixel_height_deg(&self) -> f64 {
        (self.north - self.south) / self.height.max(1) as f64
    }

    /// Lon/lat of the pixel-grid vertex at (row, col). Vertex (0, 0) is the
    /// north-west corner; rows grow southwards.
    pub fn corner_to_geo(&self, row: usize, col: usize) -> (f64, f64) {
        (
            self.west + col as f64 * self.pixel_width_deg(),
            self.north - row as f64 * self.pixel_height_deg(),
        )
    }

    /// Lon/lat of a pixel centre.
    pub fn pixel_center(&self, row: usize, col: usize) -> (f64, f64) {
        (
            self.west + (col as f64 + 0.5) * self.pixel_width_deg(),
            self.north - (row as f64 + 0.5) * self.pixel_height_deg(),
        )
    }

    /// Approximate ground area of one pixel in square metres
    /// (equirectangular at the centre latitude).
    pub fn pixel_area_m2(&self) -> f64 {
        let mid_lat = ((self.north + self.south) / 2.0).to_radians();
        let dx = self.pixel_width_deg().to_radians() * EARTH_RADIUS_M * mid_lat.cos();
        let dy = self.pixel_height_deg().to_radians() * EARTH_RADIUS_M;
        (dx * dy).abs()
    }

    /// Leaflet-style `[[south, west], [north, east]]` corner pair.
    pub fn to_lat_lon_pairs(&self) -> [[f64; 2]; 2] {
        [[self.south, self.west], [self.north, self.east]]
    }
}

/// Everything an `ImageSource` returns for one field and date.
#[derive(Clone, Debug)]
pub struct Scene {
    /// Acquisition date of the imagery (may differ from the requested date).
    pub capture_date: NaiveDate,
    pub bands: BandStack,
    pub mask: SceneMask,
    pub bounds: GeoBounds,
    /// Ground area of one pixel in square metres.
    pub pixel_area_m2: f64,
}

impl Scene {
    pub fn new(
        capture_date: NaiveDate,
        bands: BandStack,
        mask: SceneMask,
        bounds: GeoBounds,
    ) -> Result<Self> {
        if bands.dim() != mask.dim() {
            return Err(AgroError::Data(format!(
                "band stack {:?} and scene mask {:?} are not co-registered",
                bands.dim(),
                mask.dim()
            )));
        }
        let pixel_area_m2 = bounds.pixel_area_m2();
        Ok(Self {
            capture_date,
            bands,
            mask,
            bounds,
            pixel_area_m2,
        })
    }
}
