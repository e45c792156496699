// ============================================================
// Layer 2 - PlateUseCase
// ============================================================
// Orchestrates synthetic plate generation:
//
//   Step 1: Parse the template            (Layer 3 - domain)
//   Step 2: Load font, build atlas        (Layer 6 + 5)
//   Step 3: Per plate: sample layout,
//           sample code, composite        (Layer 5 - plate)
//   Step 4: Write PNGs + labels.csv
//
// One seeded ChaCha stream drives the whole job, so the same
// seed and font reproduce the same directory of plates.

use anyhow::{Context, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::domain::symbol::{Template, DEFAULT_TEMPLATE};
use crate::infra::font_store::FontStore;
use crate::plate::{
    atlas::{default_alphabet, CharAtlas},
    code::generate_code,
    compositor::{composite_with_params, PlateColors, PlateParams},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlateJobConfig {
    pub font_path:   String,
    pub font_height: u32,
    pub count:       usize,
    pub template:    String,
    pub seed:        u64,
    pub out_dir:     String,
    pub colors:      PlateColors,
}

impl Default for PlateJobConfig {
    fn default() -> Self {
        Self {
            font_path:   "UKNumberPlate.ttf".to_string(),
            font_height: 32,
            count:       10,
            template:    DEFAULT_TEMPLATE.to_string(),
            seed:        0,
            out_dir:     "plates".to_string(),
            colors:      PlateColors::default(),
        }
    }
}

/// One written plate
#[derive(Debug, Clone, PartialEq)]
pub struct PlateRecord {
    pub file:   String,
    pub code:   String,
    pub width:  u32,
    pub height: u32,
}

pub struct PlateUseCase {
    config: PlateJobConfig,
}

impl PlateUseCase {
    pub fn new(config: PlateJobConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<Vec<PlateRecord>> {
        let cfg = &self.config;

        // Bad templates fail before the font is touched
        let template: Template = cfg
            .template
            .parse()
            .with_context(|| format!("Invalid template '{}'", cfg.template))?;

        let rasterizer = FontStore::new(&cfg.font_path).load(cfg.font_height)?;
        let atlas = CharAtlas::build(&rasterizer, cfg.font_height, &default_alphabet())
            .with_context(|| format!("Cannot build atlas from '{}'", cfg.font_path))?;
        tracing::info!("Atlas ready: {} glyphs at {}px", atlas.len(), atlas.height());

        let mut rng = ChaCha8Rng::seed_from_u64(cfg.seed);
        write_plates(&atlas, &template, cfg, &mut rng)
    }
}

/// Composite `cfg.count` plates from `atlas` into `cfg.out_dir`.
pub fn write_plates<R: Rng + ?Sized>(
    atlas:    &CharAtlas,
    template: &Template,
    cfg:      &PlateJobConfig,
    rng:      &mut R,
) -> Result<Vec<PlateRecord>> {
    let out_dir = PathBuf::from(&cfg.out_dir);
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("Cannot create output directory '{}'", out_dir.display()))?;

    let mut records = Vec::with_capacity(cfg.count);
    for i in 0..cfg.count {
        let params = PlateParams::sample(atlas.height(), rng);
        let code = generate_code(Some(template), rng);
        let plate = composite_with_params(atlas, &code, params, &cfg.colors)
            .with_context(|| format!("Cannot composite plate {i} ('{code}')"))?;

        let file = format!("plate_{i:05}.png");
        let path = out_dir.join(&file);
        plate
            .to_rgb8()
            .save(&path)
            .with_context(|| format!("Cannot write plate '{}'", path.display()))?;
        tracing::debug!("{} -> '{}' ({}x{})", file, code, plate.width(), plate.height());

        records.push(PlateRecord {
            file,
            code,
            width:  plate.width(),
            height: plate.height(),
        });
    }

    write_labels(&out_dir.join("labels.csv"), &records)?;
    tracing::info!("Wrote {} plates to '{}'", records.len(), out_dir.display());
    Ok(records)
}

fn write_labels(path: &Path, records: &[PlateRecord]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Cannot create '{}'", path.display()))?;
    let mut out = BufWriter::new(file);
    writeln!(out, "file,code")?;
    for r in records {
        writeln!(out, "{},{}", r.file, r.code)?;
    }
    out.flush()?;
    Ok(())
}

/// `count` codes for `template`, reproducible from `seed`.
pub fn generate_codes(template: &str, count: usize, seed: u64) -> Result<Vec<String>> {
    let template: Template = template
        .parse()
        .with_context(|| format!("Invalid template '{template}'"))?;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    Ok((0..count).map(|_| generate_code(Some(&template), &mut rng)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plate::testing::BlockRasterizer;

    fn block_atlas() -> CharAtlas {
        CharAtlas::build(&BlockRasterizer, 20, &default_alphabet()).unwrap()
    }

    #[test]
    fn test_generate_codes_is_seeded() {
        let a = generate_codes("LLDDSLLL", 5, 9).unwrap();
        let b = generate_codes("LLDDSLLL", 5, 9).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 5);
        let template = Template::default();
        assert!(a.iter().all(|c| template.matches(c)));
    }

    #[test]
    fn test_generate_codes_rejects_bad_template() {
        assert!(generate_codes("LL?", 1, 0).is_err());
    }

    #[test]
    fn test_write_plates_outputs_pngs_and_labels() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = PlateJobConfig {
            count:   3,
            out_dir: dir.path().to_string_lossy().into_owned(),
            ..PlateJobConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let records = write_plates(&block_atlas(), &Template::default(), &cfg, &mut rng).unwrap();

        assert_eq!(records.len(), 3);
        for r in &records {
            let img = image::open(dir.path().join(&r.file)).unwrap();
            assert_eq!((img.width(), img.height()), (r.width, r.height));
        }

        let labels = fs::read_to_string(dir.path().join("labels.csv")).unwrap();
        let lines: Vec<&str> = labels.lines().collect();
        assert_eq!(lines[0], "file,code");
        assert_eq!(lines[1], format!("plate_00000.png,{}", records[0].code));
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_bad_template_fails_before_font_load() {
        let cfg = PlateJobConfig {
            template:  "LX?".to_string(),
            font_path: "/no/such/font.ttf".to_string(),
            ..PlateJobConfig::default()
        };
        let err = PlateUseCase::new(cfg).execute().unwrap_err();
        assert!(format!("{err:#}").contains("Invalid template"));
    }
}
