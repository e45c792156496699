// ============================================================
// Layer 6 - Font Store
// ============================================================
// Reads the plate font from disk and hands back a rasterizer
// sized for the requested glyph height.

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::plate::font::FontRasterizer;

pub struct FontStore {
    path: PathBuf,
}

impl FontStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the font file and prepare it for `glyph_height`-pixel glyphs.
    pub fn load(&self, glyph_height: u32) -> Result<FontRasterizer> {
        let bytes = std::fs::read(&self.path)
            .with_context(|| format!("Cannot read font '{}'", self.path.display()))?;
        tracing::info!("Loaded font '{}' ({} bytes)", self.path.display(), bytes.len());

        FontRasterizer::for_glyph_height(bytes, glyph_height)
            .with_context(|| format!("Cannot use font '{}'", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_font_names_path() {
        let err = FontStore::new("/no/such/UKNumberPlate.ttf").load(32).unwrap_err();
        assert!(format!("{err:#}").contains("UKNumberPlate.ttf"));
    }

    #[test]
    fn test_invalid_font_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ttf");
        std::fs::write(&path, b"not a font").unwrap();
        assert!(FontStore::new(&path).load(32).is_err());
    }
}
