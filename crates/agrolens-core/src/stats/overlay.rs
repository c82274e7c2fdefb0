use std::path::Path;

use image::{ImageFormat, Rgba, RgbaImage};

use crate::error::Result;
use crate::raster::{GeoBounds, IndexRaster};

use super::colormap::color_for;

/// Colorized index raster plus the geographic extent it covers.
#[derive(Clone, Debug)]
pub struct Overlay {
    pub image: RgbaImage,
    pub bounds: GeoBounds,
}

/// Render an index raster through its color ramp. Invalid pixels are fully
/// transparent.
pub fn render_overlay(raster: &IndexRaster, bounds: GeoBounds) -> Overlay {
    let (h, w) = raster.dim();
    let mut img = RgbaImage::new(w as u32, h as u32);
    for row in 0..h {
        for col in 0..w {
            let pixel = if raster.valid[[row, col]] {
                let [r, g, b] = color_for(raster.index, raster.values[[row, col]]);
                Rgba([r, g, b, 255])
            } else {
                Rgba([0, 0, 0, 0])
            };
            img.put_pixel(col as u32, row as u32, pixel);
        }
    }
    Overlay { image: img, bounds }
}

/// Save an overlay as 8-bit RGBA PNG.
pub fn save_png(overlay: &Overlay, path: &Path) -> Result<()> {
    overlay.image.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// Encode an overlay as PNG bytes for in-memory transport.
pub fn encode_png(overlay: &Overlay) -> Result<Vec<u8>> {
    let mut buf = std::io::Cursor::new(Vec::new());
    overlay.image.write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}
