// ============================================================
// Layer 3 - Core Traits (Abstractions)
// ============================================================
// The two seams where an implementation can be swapped:
//
//   GlyphRasterizer  - draws symbols at a reference size.
//                      FontRasterizer implements it over a real
//                      TrueType font; tests use a synthetic one
//                      so the atlas can be checked without assets.
//
//   DigitSource      - supplies training and test digits.
//                      IdxLoader implements it over the IDX files.

use anyhow::Result;
use image::GrayImage;

use crate::domain::digit::DigitImage;

// ─── GlyphRasterizer ──────────────────────────────────────────────────────────
/// Anything that can draw a symbol into an 8-bit coverage canvas.
pub trait GlyphRasterizer {
    /// Native (width, height) of the symbol's cell at the reference size.
    fn measure(&self, symbol: char) -> (u32, u32);

    /// Draw `symbol` anchored at the top-left of a `width` x `height`
    /// canvas. Ink is 255, background 0. Must be deterministic.
    fn render(&self, symbol: char, width: u32, height: u32) -> GrayImage;
}

// ─── DigitSource ──────────────────────────────────────────────────────────────
/// Any component that can load the digit dataset.
pub trait DigitSource {
    /// The full training split (validation is carved out later)
    fn load_train(&self) -> Result<Vec<DigitImage>>;

    /// The held-out test split
    fn load_test(&self) -> Result<Vec<DigitImage>>;
}
