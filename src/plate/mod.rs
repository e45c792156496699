// ============================================================
// Layer 5 - Plate Synthesis
// ============================================================
// Everything needed to turn a font into synthetic licence-plate
// rasters for a plate-recognition model:
//
//   font.rs        - GlyphRasterizer over a TrueType font (ab_glyph)
//   atlas.rs       - fixed-height glyph table + space variants
//   code.rs        - random plate codes from a template
//   compositor.rs  - glyph layout, text mask, two-colour blend
//   rotation.rs    - yaw/pitch/roll matrix for a later warp stage
//
// All randomness comes from a caller-owned Rng so every function
// here is reproducible from a seed and safe to run in parallel.

pub mod atlas;
pub mod code;
pub mod compositor;
pub mod font;
pub mod rotation;

#[cfg(test)]
pub(crate) mod testing {
    use image::{GrayImage, Luma};

    use crate::domain::traits::GlyphRasterizer;

    /// Deterministic stand-in for a font: every symbol is a solid
    /// block inside a 40-pixel-high cell; spaces are blank.
    pub struct BlockRasterizer;

    impl GlyphRasterizer for BlockRasterizer {
        fn measure(&self, symbol: char) -> (u32, u32) {
            let width = match symbol {
                'W' => 40,
                'I' => 10,
                ' ' => 16,
                c if c.is_ascii_digit() => 24,
                _ => 30,
            };
            (width, 40)
        }

        fn render(&self, symbol: char, width: u32, height: u32) -> GrayImage {
            if symbol == ' ' {
                return GrayImage::new(width, height);
            }
            GrayImage::from_fn(width, height, |x, y| {
                let inside = x >= 2 && x + 2 < width && y >= 4 && y + 4 < height;
                Luma([if inside { 255 } else { 0 }])
            })
        }
    }
}
