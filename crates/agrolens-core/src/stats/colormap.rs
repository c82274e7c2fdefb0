//! Per-index color ramps and multi-stop interpolation.

use crate::indices::VegetationIndex;

/// A color stop: position in [0, 1] mapped to an RGB color.
#[derive(Debug, Clone, Copy)]
pub struct ColorStop {
    pub t: f32,
    pub rgb: [u8; 3],
}

impl ColorStop {
    pub const fn new(t: f32, r: u8, g: u8, b: u8) -> Self {
        Self { t, rgb: [r, g, b] }
    }
}

/// Brown -> gold -> yellow -> yellow-green -> dark green.
const NDVI_STOPS: &[ColorStop] = &[
    ColorStop::new(0.0, 0x8B, 0x45, 0x13),
    ColorStop::new(0.2, 0xD2, 0x69, 0x1E),
    ColorStop::new(0.3, 0xFF, 0xD7, 0x00),
    ColorStop::new(0.4, 0xFF, 0xFF, 0x00),
    ColorStop::new(0.5, 0xAD, 0xFF, 0x2F),
    ColorStop::new(0.6, 0x7F, 0xFF, 0x00),
    ColorStop::new(0.7, 0x00, 0xFF, 0x00),
    ColorStop::new(0.8, 0x22, 0x8B, 0x22),
    ColorStop::new(1.0, 0x00, 0x64, 0x00),
];

const EVI_STOPS: &[ColorStop] = &[
    ColorStop::new(0.0, 0x8B, 0x45, 0x13),
    ColorStop::new(0.2, 0xFF, 0xD7, 0x00),
    ColorStop::new(0.4, 0xAD, 0xFF, 0x2F),
    ColorStop::new(0.6, 0x00, 0xFF, 0x00),
    ColorStop::new(1.0, 0x00, 0x64, 0x00),
];

/// Green (healthy) -> yellow -> red (senescent).
const PSRI_STOPS: &[ColorStop] = &[
    ColorStop::new(0.0, 0x00, 0xFF, 0x00),
    ColorStop::new(0.5, 0xFF, 0xFF, 0x00),
    ColorStop::new(1.0, 0xFF, 0x00, 0x00),
];

/// Red (burned) -> yellow -> green (healthy).
const NBR_STOPS: &[ColorStop] = &[
    ColorStop::new(0.0, 0xFF, 0x00, 0x00),
    ColorStop::new(0.3, 0xFF, 0xFF, 0x00),
    ColorStop::new(0.5, 0x00, 0xFF, 0x00),
    ColorStop::new(1.0, 0x00, 0x64, 0x00),
];

/// Brown (bare) -> white (snow) -> pale blue (ice).
const NDSI_STOPS: &[ColorStop] = &[
    ColorStop::new(0.0, 0x8B, 0x45, 0x13),
    ColorStop::new(0.3, 0xFF, 0xFF, 0xFF),
    ColorStop::new(1.0, 0xE0, 0xF8, 0xFF),
];

pub fn stops_for(index: VegetationIndex) -> &'static [ColorStop] {
    match index {
        VegetationIndex::Ndvi => NDVI_STOPS,
        VegetationIndex::Evi => EVI_STOPS,
        VegetationIndex::Psri => PSRI_STOPS,
        VegetationIndex::Nbr => NBR_STOPS,
        VegetationIndex::Ndsi => NDSI_STOPS,
    }
}

/// Interpolate a ramp at `t` (clamped to [0, 1]).
pub fn interpolate(stops: &[ColorStop], t: f32) -> [u8; 3] {
    let t = t.clamp(0.0, 1.0);
    let Some(first) = stops.first() else {
        return [0, 0, 0];
    };
    if t <= first.t {
        return first.rgb;
    }
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b.t {
            let span = b.t - a.t;
            let f = if span > 0.0 { (t - a.t) / span } else { 0.0 };
            let mut out = [0u8; 3];
            for (i, o) in out.iter_mut().enumerate() {
                let lerp = a.rgb[i] as f32 + (b.rgb[i] as f32 - a.rgb[i] as f32) * f;
                *o = lerp.round().clamp(0.0, 255.0) as u8;
            }
            return out;
        }
    }
    stops[stops.len() - 1].rgb
}

/// Map an index value to a color over the index's display range.
pub fn color_for(index: VegetationIndex, value: f32) -> [u8; 3] {
    let (lo, hi) = index.display_range();
    let t = (value - lo) / (hi - lo);
    interpolate(stops_for(index), t)
}
