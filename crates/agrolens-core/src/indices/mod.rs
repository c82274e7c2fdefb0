//! Spectral vegetation indices computed from Sentinel-2 reflectance.

pub mod calculator;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AgroError, Result};
use crate::raster::Band;

pub use calculator::{compute_index, compute_indices};

/// Supported vegetation indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VegetationIndex {
    /// Normalized Difference Vegetation Index.
    Ndvi,
    /// Enhanced Vegetation Index.
    Evi,
    /// Plant Senescence Reflectance Index.
    Psri,
    /// Normalized Burn Ratio.
    Nbr,
    /// Normalized Difference Snow Index.
    Ndsi,
}

/// Descriptive catalog entry for one index.
#[derive(Clone, Debug, Serialize)]
pub struct IndexInfo {
    pub index: VegetationIndex,
    pub name: &'static str,
    pub formula: &'static str,
    /// (value range, meaning) pairs, lowest first.
    pub interpretation: &'static [(&'static str, &'static str)],
}

impl VegetationIndex {
    pub const ALL: [VegetationIndex; 5] = [
        Self::Ndvi,
        Self::Evi,
        Self::Psri,
        Self::Nbr,
        Self::Ndsi,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Self::Ndvi => "NDVI",
            Self::Evi => "EVI",
            Self::Psri => "PSRI",
            Self::Nbr => "NBR",
            Self::Ndsi => "NDSI",
        }
    }

    /// Bands read by the formula.
    pub fn required_bands(self) -> &'static [Band] {
        match self {
            Self::Ndvi => &[Band::B04, Band::B08],
            Self::Evi => &[Band::B02, Band::B04, Band::B08],
            Self::Psri => &[Band::B03, Band::B04, Band::B08],
            Self::Nbr => &[Band::B08, Band::B12],
            Self::Ndsi => &[Band::B03, Band::B11],
        }
    }

    /// Physically meaningful value range. Values outside it are invalid
    /// pixels, and forecasts are clipped to it.
    pub fn valid_range(self) -> (f32, f32) {
        (-1.0, 1.0)
    }

    /// Value range spread across the display color ramp.
    pub fn display_range(self) -> (f32, f32) {
        match self {
            Self::Ndvi | Self::Evi => (0.0, 1.0),
            Self::Psri => (-0.2, 0.8),
            Self::Nbr | Self::Ndsi => (-1.0, 1.0),
        }
    }

    pub fn info(self) -> IndexInfo {
        match self {
            Self::Ndvi => IndexInfo {
                index: self,
                name: "Normalized Difference Vegetation Index",
                formula: "(NIR - RED) / (NIR + RED)",
                interpretation: &[
                    ("< 0.2", "soil, water, barren land"),
                    ("0.2 - 0.4", "sparse or stressed vegetation"),
                    ("0.4 - 0.6", "moderate vegetation"),
                    ("> 0.6", "dense, healthy vegetation"),
                ],
            },
            Self::Evi => IndexInfo {
                index: self,
                name: "Enhanced Vegetation Index",
                formula: "2.5 * (NIR - RED) / (NIR + 6*RED - 7.5*BLUE + 1)",
                interpretation: &[
                    ("< 0.2", "low vegetation"),
                    ("0.2 - 0.4", "moderate vegetation"),
                    ("> 0.4", "high vegetation, less saturated than NDVI"),
                ],
            },
            Self::Psri => IndexInfo {
                index: self,
                name: "Plant Senescence Reflectance Index",
                formula: "(RED - GREEN) / NIR",
                interpretation: &[
                    ("low", "healthy green vegetation"),
                    ("high", "senescence, ripening or stress"),
                ],
            },
            Self::Nbr => IndexInfo {
                index: self,
                name: "Normalized Burn Ratio",
                formula: "(NIR - SWIR2) / (NIR + SWIR2)",
                interpretation: &[
                    ("< 0.0", "severe fire damage"),
                    ("~ 0.0", "recent burn"),
                    ("> 0.1", "healthy vegetation"),
                ],
            },
            Self::Ndsi => IndexInfo {
                index: self,
                name: "Normalized Difference Snow Index",
                formula: "(GREEN - SWIR1) / (GREEN + SWIR1)",
                interpretation: &[
                    ("< 0.0", "no snow"),
                    ("0.0 - 0.4", "possible snow"),
                    ("> 0.4", "snow and ice"),
                ],
            },
        }
    }
}

impl std::fmt::Display for VegetationIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for VegetationIndex {
    type Err = AgroError;

    fn from_str(s: &str) -> Result<Self> {
        VegetationIndex::ALL
            .iter()
            .copied()
            .find(|i| i.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AgroError::InvalidParameter(format!("unknown index '{s}'")))
    }
}
