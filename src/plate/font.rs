// ============================================================
// Layer 5 - Font Rasterizer
// ============================================================
// GlyphRasterizer backed by a TrueType/OpenType font via ab_glyph.
//
// Every cell is as wide as the glyph's horizontal advance and as
// tall as the font's ascent-to-descent line height, so all cells
// share one baseline. Glyphs are drawn at a large reference size
// (4x the target height) and scaled down later by the atlas.

use ab_glyph::{point, Font, FontVec, PxScale, ScaleFont};
use image::GrayImage;

use crate::domain::{error::PlateError, traits::GlyphRasterizer};

/// Reference size is this multiple of the final glyph height
pub const REFERENCE_SCALE: f32 = 4.0;

pub struct FontRasterizer {
    font:  FontVec,
    scale: PxScale,
}

impl std::fmt::Debug for FontRasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontRasterizer")
            .field("glyphs", &self.font.glyph_count())
            .field("scale", &self.scale)
            .finish()
    }
}

impl FontRasterizer {
    /// Parse font bytes and rasterise at `reference_px` pixels.
    pub fn from_bytes(bytes: Vec<u8>, reference_px: f32) -> Result<Self, PlateError> {
        if reference_px <= 0.0 {
            return Err(PlateError::Config(format!(
                "reference font size must be positive, got {reference_px}"
            )));
        }
        let font = FontVec::try_from_vec(bytes)
            .map_err(|e| PlateError::FontLoad(e.to_string()))?;
        Ok(Self { font, scale: PxScale::from(reference_px) })
    }

    /// Rasterizer sized for an atlas of `glyph_height`-pixel glyphs
    pub fn for_glyph_height(bytes: Vec<u8>, glyph_height: u32) -> Result<Self, PlateError> {
        Self::from_bytes(bytes, glyph_height as f32 * REFERENCE_SCALE)
    }
}

impl GlyphRasterizer for FontRasterizer {
    fn measure(&self, symbol: char) -> (u32, u32) {
        let scaled = self.font.as_scaled(self.scale);
        let id = scaled.glyph_id(symbol);
        let width = scaled.h_advance(id).ceil().max(0.0) as u32;
        let height = scaled.height().ceil().max(0.0) as u32;
        (width, height)
    }

    fn render(&self, symbol: char, width: u32, height: u32) -> GrayImage {
        let mut canvas = GrayImage::new(width, height);
        let scaled = self.font.as_scaled(self.scale);

        let mut glyph = scaled.scaled_glyph(symbol);
        glyph.position = point(0.0, scaled.ascent());

        if let Some(outline) = self.font.outline_glyph(glyph) {
            let bounds = outline.px_bounds();
            outline.draw(|x, y, coverage| {
                let px = bounds.min.x as i64 + i64::from(x);
                let py = bounds.min.y as i64 + i64::from(y);
                if px < 0 || py < 0 || px >= i64::from(width) || py >= i64::from(height) {
                    return;
                }
                let value = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
                let pixel = canvas.get_pixel_mut(px as u32, py as u32);
                pixel.0[0] = pixel.0[0].max(value);
            });
        }

        canvas
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_bytes_are_rejected() {
        let result = FontRasterizer::from_bytes(vec![0u8; 16], 128.0);
        assert!(matches!(result, Err(PlateError::FontLoad(_))));
    }

    #[test]
    fn test_non_positive_size_is_config_error() {
        let result = FontRasterizer::from_bytes(Vec::new(), 0.0);
        assert!(matches!(result, Err(PlateError::Config(_))));
    }

    // Tests below need a real TrueType font; they pass vacuously on
    // machines without one of these installed.
    const SYSTEM_FONTS: [&str; 4] = [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/Library/Fonts/Arial.ttf",
    ];

    fn system_font() -> Option<Vec<u8>> {
        let found = SYSTEM_FONTS.iter().find_map(|p| std::fs::read(p).ok());
        if found.is_none() {
            eprintln!("no system TrueType font found, skipping");
        }
        found
    }

    fn ink_rows(img: &GrayImage) -> Option<(u32, u32)> {
        let rows: Vec<u32> = (0..img.height())
            .filter(|&y| (0..img.width()).any(|x| img.get_pixel(x, y).0[0] > 0))
            .collect();
        Some((*rows.first()?, *rows.last()?))
    }

    #[test]
    fn test_measure_shares_one_line_height() {
        let Some(bytes) = system_font() else { return };
        let font = FontRasterizer::for_glyph_height(bytes, 32).unwrap();

        let (w_width, w_height) = font.measure('W');
        let (i_width, i_height) = font.measure('I');
        let (space_width, space_height) = font.measure(' ');
        assert_eq!(w_height, i_height);
        assert_eq!(w_height, space_height);
        assert!(w_width > i_width);
        assert!(space_width > 0);
    }

    #[test]
    fn test_render_sits_on_the_baseline() {
        let Some(bytes) = system_font() else { return };
        let font = FontRasterizer::for_glyph_height(bytes, 32).unwrap();
        let ascent = font.font.as_scaled(font.scale).ascent();

        let (width, height) = font.measure('A');
        let glyph = font.render('A', width, height);
        assert_eq!(glyph.dimensions(), (width, height));

        let (top, bottom) = ink_rows(&glyph).expect("'A' should have ink");
        assert!(top > 0, "cap height stays below the ascent line");
        assert!(((bottom + 1) as f32 - ascent).abs() <= 2.0, "bottom {bottom}, ascent {ascent}");

        let space = font.render(' ', width, height);
        assert!(ink_rows(&space).is_none());
    }

    #[test]
    fn test_render_clips_to_small_canvas() {
        let Some(bytes) = system_font() else { return };
        let font = FontRasterizer::for_glyph_height(bytes, 32).unwrap();
        let tiny = font.render('W', 5, 5);
        assert_eq!(tiny.dimensions(), (5, 5));
    }

    #[test]
    fn test_same_font_builds_identical_atlas() {
        use crate::plate::atlas::{default_alphabet, CharAtlas};

        let Some(bytes) = system_font() else { return };
        let a = FontRasterizer::for_glyph_height(bytes.clone(), 24).unwrap();
        let b = FontRasterizer::for_glyph_height(bytes, 24).unwrap();
        let atlas_a = CharAtlas::build(&a, 24, &default_alphabet()).unwrap();
        let atlas_b = CharAtlas::build(&b, 24, &default_alphabet()).unwrap();

        assert_eq!(atlas_a.len(), atlas_b.len());
        for (ga, gb) in atlas_a.glyphs().zip(atlas_b.glyphs()) {
            assert_eq!(ga.height(), 24);
            assert_eq!(ga.symbol(), gb.symbol());
            assert_eq!(ga.raster().as_raw(), gb.raster().as_raw());
        }
    }
}
