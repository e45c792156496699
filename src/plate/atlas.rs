// ============================================================
// Layer 5 - Character Atlas Builder
// ============================================================
// Rasterises every symbol of an alphabet once and rescales it so
// that all glyphs share exactly the same pixel height.
//
// Steps:
//   1. Measure every symbol at the reference size. The tallest
//      cell becomes the native height shared by all canvases.
//   2. scale = target_height / native_height (one factor for the
//      whole alphabet, so aspect ratios are preserved).
//   3. Draw each symbol on a (own_width x native_height) canvas and
//      resize it to (floor(own_width * scale), target_height).
//   4. Stretch the space cell by 2.0, 1.5 and 4.0 to obtain the
//      double, wide and quad space glyphs.

use std::collections::BTreeMap;

use image::{
    imageops::{self, FilterType},
    GrayImage,
};

use crate::domain::{
    error::PlateError,
    glyph::Glyph,
    symbol::{DIGITS, DOUBLE_SPACE, LETTERS, QUAD_SPACE, SPACE, WIDE_SPACE},
    traits::GlyphRasterizer,
};

/// Width multipliers applied to the space cell
pub const SPACE_VARIANTS: [(char, f32); 3] = [
    (DOUBLE_SPACE, 2.0),
    (WIDE_SPACE, 1.5),
    (QUAD_SPACE, 4.0),
];

/// Letters, digits and the normal space
pub fn default_alphabet() -> Vec<char> {
    LETTERS
        .chars()
        .chain(DIGITS.chars())
        .chain(std::iter::once(SPACE))
        .collect()
}

/// Immutable symbol -> glyph table with a common glyph height.
#[derive(Debug, Clone, PartialEq)]
pub struct CharAtlas {
    height: u32,
    glyphs: BTreeMap<char, Glyph>,
}

impl CharAtlas {
    /// Build an atlas of `height`-pixel glyphs for `alphabet`.
    /// The normal space is always included because the space
    /// variants are derived from it.
    pub fn build<R>(rasterizer: &R, height: u32, alphabet: &[char]) -> Result<Self, PlateError>
    where
        R: GlyphRasterizer + ?Sized,
    {
        if height == 0 {
            return Err(PlateError::Config("glyph height must be positive".into()));
        }
        if alphabet.is_empty() {
            return Err(PlateError::Config("alphabet is empty".into()));
        }

        let mut symbols: Vec<char> = Vec::with_capacity(alphabet.len() + 1);
        for &c in alphabet.iter().chain(std::iter::once(&SPACE)) {
            if !symbols.contains(&c) {
                symbols.push(c);
            }
        }

        // (symbol, native width) plus the tallest native cell
        let cells: Vec<(char, u32)> = symbols
            .iter()
            .map(|&c| (c, rasterizer.measure(c).0))
            .collect();
        let native_height = symbols
            .iter()
            .map(|&c| rasterizer.measure(c).1)
            .max()
            .unwrap_or(0);

        if native_height == 0 {
            return Err(PlateError::Config(
                "rasterizer produced glyphs of zero height".into(),
            ));
        }
        let widest = cells.iter().map(|&(_, w)| w).max().unwrap_or(0);
        if widest == 0 {
            return Err(PlateError::Config(
                "widest glyph in the alphabet has zero width".into(),
            ));
        }

        let scale = height as f32 / native_height as f32;
        tracing::debug!(
            "Atlas: {} symbols, native height {}, scale {:.4}",
            cells.len(),
            native_height,
            scale
        );

        let mut glyphs = BTreeMap::new();
        for &(symbol, width) in &cells {
            let canvas = rasterizer.render(symbol, width, native_height);
            glyphs.insert(symbol, resize_cell(symbol, &canvas, width as f32 * scale, height));
        }

        let (space_width, _) = rasterizer.measure(SPACE);
        let space_canvas = rasterizer.render(SPACE, space_width, native_height);
        for (symbol, multiplier) in SPACE_VARIANTS {
            let target = space_width as f32 * scale * multiplier;
            glyphs.insert(symbol, resize_cell(symbol, &space_canvas, target, height));
        }

        tracing::info!("Built character atlas: {} glyphs of height {}", glyphs.len(), height);
        Ok(Self { height, glyphs })
    }

    /// Common glyph height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, symbol: char) -> Option<&Glyph> {
        self.glyphs.get(&symbol)
    }

    /// Like `get` but reports a missing symbol as an error
    pub fn glyph(&self, symbol: char) -> Result<&Glyph, PlateError> {
        self.get(symbol).ok_or(PlateError::MissingGlyph(symbol))
    }

    pub fn contains(&self, symbol: char) -> bool {
        self.glyphs.contains_key(&symbol)
    }

    /// Symbols in ascending order
    pub fn symbols(&self) -> impl Iterator<Item = char> + '_ {
        self.glyphs.keys().copied()
    }

    pub fn glyphs(&self) -> impl Iterator<Item = &Glyph> {
        self.glyphs.values()
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

/// Resize a native cell to the target height. Widths round down and
/// never drop below one pixel.
fn resize_cell(symbol: char, canvas: &GrayImage, target_width: f32, height: u32) -> Glyph {
    let width = (target_width.floor() as u32).max(1);
    if canvas.width() == 0 || canvas.height() == 0 {
        return Glyph::from_gray(symbol, &GrayImage::new(width, height));
    }
    let resized = imageops::resize(canvas, width, height, FilterType::Lanczos3);
    Glyph::from_gray(symbol, &resized)
}
