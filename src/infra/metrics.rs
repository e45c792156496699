// ============================================================
// Layer 6 - Metrics Logger
// ============================================================
// Writes the training log directory:
//
//   metrics.csv                - one row per validation step
//   samples_step_NNNNN.png     - input digits (top row) above
//                                their reconstructions (bottom row)
//
// Example CSV output:
//   step,epoch,validation_loss
//   0,0,0.112340
//   10,0,0.097110
//   ...
//
// Any plotting tool that reads CSV can chart the loss curve.

use anyhow::{Context, Result};
use image::{GrayImage, Luma};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};
use serde::{Deserialize, Serialize};

use crate::domain::digit::IMAGE_SIDE;

/// One validation measurement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepMetrics {
    /// Training step at which validation ran
    pub step: usize,

    /// Epoch the step belongs to (starts at 0)
    pub epoch: usize,

    /// Mean squared reconstruction error on the validation batch
    pub validation_loss: f64,
}

impl StepMetrics {
    pub fn new(step: usize, epoch: usize, validation_loss: f64) -> Self {
        Self { step, epoch, validation_loss }
    }

    /// Returns true if this step improved over the previous best loss
    pub fn is_improvement(&self, best_loss: f64) -> bool {
        self.validation_loss < best_loss
    }
}

/// Appends validation metrics and sample images to a log directory.
pub struct MetricsLogger {
    dir:      PathBuf,
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create the directory and write the CSV header if the file is new.
    pub fn new(dir: impl Into<String>) -> Result<Self> {
        let dir = PathBuf::from(dir.into());
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create log directory '{}'", dir.display()))?;

        let csv_path = dir.join("metrics.csv");

        // Appending across runs keeps earlier curves in the same file
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "step,epoch,validation_loss")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { dir, csv_path })
    }

    /// Append one row to the CSV.
    pub fn log(&self, m: &StepMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)?;

        writeln!(f, "{},{},{:.6}", m.step, m.epoch, m.validation_loss)?;

        tracing::debug!("Logged step {} validation_loss={:.4}", m.step, m.validation_loss);
        Ok(())
    }

    /// Save inputs above reconstructions as one PNG strip.
    /// Each slice is a row-major 28x28 image in [0, 1].
    pub fn write_snapshot(&self, step: usize, inputs: &[&[f32]], outputs: &[&[f32]]) -> Result<PathBuf> {
        let count = inputs.len().min(outputs.len());
        let side  = IMAGE_SIDE as u32;
        let mut strip = GrayImage::new(side * count.max(1) as u32, side * 2);

        for (i, (input, output)) in inputs.iter().zip(outputs).take(count).enumerate() {
            paint(&mut strip, input, i as u32 * side, 0);
            paint(&mut strip, output, i as u32 * side, side);
        }

        let path = self.dir.join(format!("samples_step_{step:05}.png"));
        strip
            .save(&path)
            .with_context(|| format!("Cannot write snapshot '{}'", path.display()))?;
        Ok(path)
    }

    /// Return the path to the metrics CSV file
    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}

fn paint(strip: &mut GrayImage, pixels: &[f32], left: u32, top: u32) {
    for (i, &v) in pixels.iter().take(IMAGE_SIDE * IMAGE_SIDE).enumerate() {
        let x = left + (i % IMAGE_SIDE) as u32;
        let y = top + (i / IMAGE_SIDE) as u32;
        strip.put_pixel(x, y, Luma([(v.clamp(0.0, 1.0) * 255.0).round() as u8]));
    }
}
