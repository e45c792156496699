// ============================================================
// Layer 3 - Glyph Domain Type
// ============================================================
// A glyph is one rasterised symbol: a single-channel image with
// intensities normalised to [0, 1]. Glyphs are produced once by
// the atlas builder and never mutated afterwards.

use image::{GrayImage, ImageBuffer, Luma};

/// Single-channel float raster used for glyphs and plate masks
pub type MaskRaster = ImageBuffer<Luma<f32>, Vec<f32>>;

#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    symbol: char,
    raster: MaskRaster,
}

impl Glyph {
    pub fn new(symbol: char, raster: MaskRaster) -> Self {
        Self { symbol, raster }
    }

    /// Convert an 8-bit coverage image to a normalised glyph.
    pub fn from_gray(symbol: char, image: &GrayImage) -> Self {
        let raster = MaskRaster::from_fn(image.width(), image.height(), |x, y| {
            Luma([f32::from(image.get_pixel(x, y).0[0]) / 255.0])
        });
        Self { symbol, raster }
    }

    pub fn symbol(&self) -> char {
        self.symbol
    }

    pub fn width(&self) -> u32 {
        self.raster.width()
    }

    pub fn height(&self) -> u32 {
        self.raster.height()
    }

    pub fn raster(&self) -> &MaskRaster {
        &self.raster
    }

    pub fn intensity(&self, x: u32, y: u32) -> f32 {
        self.raster.get_pixel(x, y).0[0]
    }

    /// True when no pixel carries any ink
    pub fn is_blank(&self) -> bool {
        self.raster.pixels().all(|p| p.0[0] == 0.0)
    }
}
