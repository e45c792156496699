// ============================================================
// Layer 5 - Plate Compositor
// ============================================================
// Lays glyphs out left to right and blends two flat colours
// through the resulting text mask.
//
//   text_width = sum(glyph widths) + (n - 1) * spacing
//   width      = floor(text_width + 2 * h_padding)
//   height     = floor(glyph_height + 2 * v_padding)
//
// Glyph i is placed at (floor(x_i), floor(v_padding)) where
// x_0 = h_padding and x_{i+1} = x_i + width_i + spacing. The pen
// position stays fractional and only the placement is floored, so
// sub-pixel spacing never accumulates into drift.

use image::{DynamicImage, Luma, Rgb, Rgb32FImage, RgbImage};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::{
    error::PlateError,
    glyph::{Glyph, MaskRaster},
};
use crate::plate::{atlas::CharAtlas, code::generate_code};

/// Randomised presentation parameters of one plate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlateParams {
    /// Left and right border in pixels
    pub h_padding: f32,
    /// Top and bottom border in pixels
    pub v_padding: f32,
    /// Extra gap between neighbouring glyphs, may be negative
    pub spacing: f32,
    /// Corner radius of the plate outline
    pub radius: u32,
}

impl PlateParams {
    /// Sample parameters relative to the glyph height `H`:
    /// h_padding in [0.2H, 0.4H), v_padding in [0.1H, 0.3H),
    /// spacing in [-0.05H, 0.05H), radius = 1 + floor(0.1H * u).
    pub fn sample<R: Rng + ?Sized>(glyph_height: u32, rng: &mut R) -> Self {
        let h = glyph_height as f32;
        let h_padding = rng.gen_range(0.2f32..0.4) * h;
        let v_padding = rng.gen_range(0.1f32..0.3) * h;
        let spacing = h * rng.gen_range(-0.05f32..0.05);
        let radius = 1 + (h * 0.1 * rng.gen::<f32>()) as u32;
        Self { h_padding, v_padding, spacing, radius }
    }

    /// Canvas (width, height) for glyphs of the given widths.
    pub fn canvas_size(&self, glyph_widths: &[u32], glyph_height: u32) -> (u32, u32) {
        let gaps = glyph_widths.len().saturating_sub(1) as f32;
        let text_width = glyph_widths.iter().map(|&w| w as f32).sum::<f32>() + gaps * self.spacing;
        let width = (text_width + 2.0 * self.h_padding).max(0.0) as u32;
        let height = (glyph_height as f32 + 2.0 * self.v_padding).max(0.0) as u32;
        (width, height)
    }
}

/// Background and ink colours as linear RGB in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlateColors {
    pub background: [f32; 3],
    pub ink:        [f32; 3],
}

impl Default for PlateColors {
    fn default() -> Self {
        Self {
            background: [1.0, 0.0, 0.0],
            ink:        [0.0, 1.0, 0.0],
        }
    }
}

/// A composited plate and everything needed to reproduce it.
#[derive(Debug, Clone)]
pub struct Plate {
    code:    String,
    params:  PlateParams,
    mask:    MaskRaster,
    raster:  Rgb32FImage,
    outline: MaskRaster,
}

impl Plate {
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn params(&self) -> &PlateParams {
        &self.params
    }

    /// Text coverage in [0, 1]
    pub fn mask(&self) -> &MaskRaster {
        &self.mask
    }

    /// Colour raster: background * (1 - mask) + ink * mask
    pub fn raster(&self) -> &Rgb32FImage {
        &self.raster
    }

    /// 1 inside the rounded plate rectangle, 0 in the cut corners
    pub fn outline(&self) -> &MaskRaster {
        &self.outline
    }

    pub fn width(&self) -> u32 {
        self.raster.width()
    }

    pub fn height(&self) -> u32 {
        self.raster.height()
    }

    /// 8-bit copy for PNG export
    pub fn to_rgb8(&self) -> RgbImage {
        DynamicImage::ImageRgb32F(self.raster.clone()).to_rgb8()
    }
}

/// Sample parameters, pick a code if none is given, and composite.
///
/// Parameters are drawn before the default code so that a seed
/// reproduces both the layout and the text.
pub fn generate_plate<R: Rng + ?Sized>(
    atlas:  &CharAtlas,
    code:   Option<&str>,
    colors: &PlateColors,
    rng:    &mut R,
) -> Result<Plate, PlateError> {
    let params = PlateParams::sample(atlas.height(), rng);
    let code = match code {
        Some(c) => c.to_owned(),
        None => generate_code(None, rng),
    };
    composite_with_params(atlas, &code, params, colors)
}

/// Deterministic part of plate generation.
pub fn composite_with_params(
    atlas:  &CharAtlas,
    code:   &str,
    params: PlateParams,
    colors: &PlateColors,
) -> Result<Plate, PlateError> {
    if code.is_empty() {
        return Err(PlateError::EmptyCode);
    }
    let glyphs = code
        .chars()
        .map(|c| atlas.glyph(c))
        .collect::<Result<Vec<&Glyph>, _>>()?;

    let widths: Vec<u32> = glyphs.iter().map(|g| g.width()).collect();
    let (width, height) = params.canvas_size(&widths, atlas.height());
    if width == 0 || height == 0 {
        return Err(PlateError::Config(format!(
            "plate parameters give an empty canvas ({width}x{height})"
        )));
    }

    let mut mask = MaskRaster::new(width, height);
    let top = params.v_padding.floor() as i64;
    let mut pen = params.h_padding;
    for glyph in &glyphs {
        stamp(&mut mask, glyph, pen.floor() as i64, top);
        pen += glyph.width() as f32 + params.spacing;
    }

    let raster = blend(&mask, colors);
    let outline = rounded_rect(width, height, params.radius);

    tracing::debug!("Composited plate '{}' at {}x{}", code, width, height);
    Ok(Plate {
        code: code.to_owned(),
        params,
        mask,
        raster,
        outline,
    })
}

/// Copy a glyph into the mask at (left, top). Overlapping glyphs keep
/// the stronger coverage; pixels outside the canvas are clipped.
fn stamp(mask: &mut MaskRaster, glyph: &Glyph, left: i64, top: i64) {
    let (w, h) = (i64::from(mask.width()), i64::from(mask.height()));
    for gy in 0..glyph.height() {
        let y = top + i64::from(gy);
        if y < 0 || y >= h {
            continue;
        }
        for gx in 0..glyph.width() {
            let x = left + i64::from(gx);
            if x < 0 || x >= w {
                continue;
            }
            let pixel = mask.get_pixel_mut(x as u32, y as u32);
            pixel.0[0] = pixel.0[0].max(glyph.intensity(gx, gy));
        }
    }
}

fn blend(mask: &MaskRaster, colors: &PlateColors) -> Rgb32FImage {
    Rgb32FImage::from_fn(mask.width(), mask.height(), |x, y| {
        let m = mask.get_pixel(x, y).0[0];
        Rgb(std::array::from_fn(|c| {
            colors.background[c] * (1.0 - m) + colors.ink[c] * m
        }))
    })
}

fn rounded_rect(width: u32, height: u32, radius: u32) -> MaskRaster {
    let (w, h) = (width as f32, height as f32);
    let r = (radius as f32).min(w / 2.0).min(h / 2.0);
    MaskRaster::from_fn(width, height, |x, y| {
        let px = x as f32 + 0.5;
        let py = y as f32 + 0.5;
        // nearest point of the inner rectangle shrunk by r
        let cx = px.clamp(r, w - r);
        let cy = py.clamp(r, h - r);
        let inside = (px - cx).powi(2) + (py - cy).powi(2) <= r * r;
        Luma([if inside { 1.0 } else { 0.0 }])
    })
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::symbol::Template;
    use crate::plate::{atlas::default_alphabet, code::generate_code_str, testing::BlockRasterizer};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn atlas() -> CharAtlas {
        CharAtlas::build(&BlockRasterizer, 32, &default_alphabet()).unwrap()
    }

    fn fixed_params() -> PlateParams {
        PlateParams { h_padding: 9.6, v_padding: 4.5, spacing: 1.3, radius: 2 }
    }

    #[test]
    fn test_sampled_params_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..200 {
            let p = PlateParams::sample(32, &mut rng);
            assert!((6.4..12.8).contains(&p.h_padding));
            assert!((3.2..9.6).contains(&p.v_padding));
            assert!((-1.6..1.6).contains(&p.spacing));
            assert!((1..=4).contains(&p.radius));
        }
    }

    #[test]
    fn test_dimensions_follow_formula() {
        let atlas = atlas();
        let code = "AB12 CDE";
        let params = fixed_params();
        let plate = composite_with_params(&atlas, code, params, &PlateColors::default()).unwrap();

        let glyph_sum: f32 = code.chars().map(|c| atlas.get(c).unwrap().width() as f32).sum();
        let expected_w = (glyph_sum + 7.0 * params.spacing + 2.0 * params.h_padding) as u32;
        let expected_h = (32.0 + 2.0 * params.v_padding) as u32;
        assert_eq!(plate.width(), expected_w);
        assert_eq!(plate.height(), expected_h);
        assert_eq!(plate.mask().dimensions(), plate.raster().dimensions());
        assert_eq!(plate.outline().dimensions(), plate.raster().dimensions());
    }

    #[test]
    fn test_same_seed_same_plate() {
        let atlas = atlas();
        let colors = PlateColors::default();
        let a = generate_plate(&atlas, None, &colors, &mut ChaCha8Rng::seed_from_u64(5)).unwrap();
        let b = generate_plate(&atlas, None, &colors, &mut ChaCha8Rng::seed_from_u64(5)).unwrap();
        assert_eq!(a.code(), b.code());
        assert_eq!(a.params(), b.params());
        assert_eq!(a.raster(), b.raster());
    }

    #[test]
    fn test_all_space_code_is_pure_background() {
        let atlas = atlas();
        let colors = PlateColors::default();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let plate = generate_plate(&atlas, Some(" dwq "), &colors, &mut rng).unwrap();
        assert!(plate.raster().pixels().all(|p| p.0 == colors.background));
    }

    #[test]
    fn test_ink_appears_where_glyphs_are() {
        let atlas = atlas();
        let colors = PlateColors::default();
        let plate = composite_with_params(&atlas, "W", fixed_params(), &colors).unwrap();
        // BlockRasterizer fills the middle of every non-space cell
        let (cx, cy) = (plate.width() / 2, plate.height() / 2);
        assert_eq!(plate.raster().get_pixel(cx, cy).0, colors.ink);
        assert_eq!(plate.raster().get_pixel(0, 0).0, colors.background);
    }

    #[test]
    fn test_mask_stays_in_unit_range() {
        let atlas = atlas();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let plate = generate_plate(&atlas, None, &PlateColors::default(), &mut rng).unwrap();
        assert!(plate.mask().pixels().all(|p| (0.0..=1.0).contains(&p.0[0])));
    }

    #[test]
    fn test_outline_cuts_corners() {
        let atlas = atlas();
        let mut params = fixed_params();
        params.radius = 4;
        let plate = composite_with_params(&atlas, "AB", params, &PlateColors::default()).unwrap();
        let (w, h) = plate.outline().dimensions();
        assert_eq!(plate.outline().get_pixel(0, 0).0[0], 0.0);
        assert_eq!(plate.outline().get_pixel(w - 1, h - 1).0[0], 0.0);
        assert_eq!(plate.outline().get_pixel(w / 2, h / 2).0[0], 1.0);
    }

    #[test]
    fn test_empty_code_fails() {
        let err = composite_with_params(&atlas(), "", fixed_params(), &PlateColors::default());
        assert!(matches!(err, Err(PlateError::EmptyCode)));
    }

    #[test]
    fn test_unknown_symbol_fails() {
        let err = composite_with_params(&atlas(), "AB#", fixed_params(), &PlateColors::default());
        assert!(matches!(err, Err(PlateError::MissingGlyph('#'))));
    }

    #[test]
    fn test_default_template_end_to_end() {
        let atlas = atlas();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let code = generate_code_str("LLDDSLLL", &mut rng).unwrap();
        assert_eq!(code.chars().count(), 8);
        assert!(Template::default().matches(&code));

        let plate = generate_plate(&atlas, Some(&code), &PlateColors::default(), &mut rng).unwrap();
        let non_space: Vec<u32> = code
            .chars()
            .filter(|&c| c != ' ')
            .map(|c| atlas.get(c).unwrap().width())
            .collect();
        let four: u32 = non_space.iter().take(4).sum();
        assert!(plate.width() > four);
    }
}
