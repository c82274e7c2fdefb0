use ndarray::{Array2, ArrayView2, Axis};
use rayon::prelude::*;
use tracing::debug;

use crate::consts::{DENOMINATOR_EPSILON, PARALLEL_PIXEL_THRESHOLD};
use crate::error::{AgroError, Result};
use crate::raster::{Band, BandStack, IndexRaster, PixelClass, SceneMask};

use super::VegetationIndex;

/// Reflectance of the bands a formula reads at one pixel.
#[derive(Clone, Copy, Default)]
struct Sample {
    blue: f32,
    green: f32,
    red: f32,
    nir: f32,
    swir1: f32,
    swir2: f32,
}

/// Evaluate `(numerator, denominator, factor)` for one pixel.
fn terms(index: VegetationIndex, s: &Sample) -> (f32, f32, f32) {
    match index {
        VegetationIndex::Ndvi => (s.nir - s.red, s.nir + s.red, 1.0),
        VegetationIndex::Evi => (
            s.nir - s.red,
            s.nir + 6.0 * s.red - 7.5 * s.blue + 1.0,
            2.5,
        ),
        VegetationIndex::Psri => (s.red - s.green, s.nir, 1.0),
        VegetationIndex::Nbr => (s.nir - s.swir2, s.nir + s.swir2, 1.0),
        VegetationIndex::Ndsi => (s.green - s.swir1, s.green + s.swir1, 1.0),
    }
}

fn physical_reflectance(v: f32) -> bool {
    v.is_finite() && (0.0..=1.0).contains(&v)
}

/// Compute one index over a band stack.
///
/// A pixel is valid only if the scene mask marks it `Valid`, every band the
/// formula reads is a finite reflectance in [0, 1], the denominator is not
/// near zero, and the result lies in the index's valid range. Invalid pixels
/// are NaN.
pub fn compute_index(
    stack: &BandStack,
    mask: &SceneMask,
    index: VegetationIndex,
) -> Result<IndexRaster> {
    let required = index.required_bands();
    let views: Vec<(Band, ArrayView2<f32>)> = required
        .iter()
        .map(|&b| Ok((b, stack.band(b)?.view())))
        .collect::<Result<_>>()?;

    if stack.dim() != mask.dim() {
        return Err(AgroError::Data(format!(
            "band stack {:?} and scene mask {:?} are not co-registered",
            stack.dim(),
            mask.dim()
        )));
    }

    let (h, w) = stack.dim();
    let (lo, hi) = index.valid_range();

    let eval_row = |row: usize| -> Vec<f32> {
        let mut out = vec![f32::NAN; w];
        for (col, slot) in out.iter_mut().enumerate() {
            if mask.classes[[row, col]] != PixelClass::Valid {
                continue;
            }
            let mut sample = Sample::default();
            let mut sane = true;
            for (band, view) in &views {
                let v = view[[row, col]];
                if !physical_reflectance(v) {
                    sane = false;
                    break;
                }
                match band {
                    Band::B02 => sample.blue = v,
                    Band::B03 => sample.green = v,
                    Band::B04 => sample.red = v,
                    Band::B08 => sample.nir = v,
                    Band::B11 => sample.swir1 = v,
                    Band::B12 => sample.swir2 = v,
                }
            }
            if !sane {
                continue;
            }
            let (num, den, factor) = terms(index, &sample);
            if den.abs() < DENOMINATOR_EPSILON {
                continue;
            }
            let value = factor * num / den;
            if value.is_finite() && value >= lo && value <= hi {
                *slot = value;
            }
        }
        out
    };

    let rows: Vec<Vec<f32>> = if h * w >= PARALLEL_PIXEL_THRESHOLD {
        (0..h).into_par_iter().map(eval_row).collect()
    } else {
        (0..h).map(eval_row).collect()
    };

    let mut values = Array2::<f32>::from_elem((h, w), f32::NAN);
    for (mut dst, src) in values.axis_iter_mut(Axis(0)).zip(rows) {
        for (d, s) in dst.iter_mut().zip(src) {
            *d = s;
        }
    }
    let valid = values.mapv(|v| !v.is_nan());

    let raster = IndexRaster {
        index,
        values,
        valid,
    };
    debug!(
        index = %index,
        valid_pixels = raster.valid_count(),
        total_pixels = h * w,
        "Computed index raster"
    );
    Ok(raster)
}

/// Compute NDVI plus every other requested index, NDVI first, no duplicates.
pub fn compute_indices(
    stack: &BandStack,
    mask: &SceneMask,
    requested: &[VegetationIndex],
) -> Result<Vec<IndexRaster>> {
    let mut order = vec![VegetationIndex::Ndvi];
    for &index in requested {
        if !order.contains(&index) {
            order.push(index);
        }
    }
    order
        .into_iter()
        .map(|index| compute_index(stack, mask, index))
        .collect()
}
