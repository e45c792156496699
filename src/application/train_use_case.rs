// ============================================================
// Layer 2 - TrainUseCase
// ============================================================
// Orchestrates the autoencoder training pipeline in order:
//
//   Step 1: Load train + test IDX files   (Layer 4 - data)
//   Step 2: Split off validation head     (Layer 4 - data)
//   Step 3: Build datasets                (Layer 4 - data)
//   Step 4: Save config                   (Layer 6 - infra)
//   Step 5: Run training loop             (Layer 5 - ml)
//   Step 6: Export weights + checkpoint   (Layer 6 - infra)
//
// Reference: Burn Book §5 (Training)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::data::{dataset::DigitDataset, loader::IdxLoader, splitter::split_train_val};
use crate::domain::traits::DigitSource;
use crate::infra::{checkpoint::CheckpointManager, metrics::MetricsLogger};
use crate::ml::trainer::run_training;

// ─── Training Configuration ──────────────────────────────────────────────────
// Every knob of a run. Saved as train_config.json next to the
// checkpoint so the architecture can be rebuilt before loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data_dir:        String,
    pub log_dir:         String,
    pub weights_dir:     String,
    pub steps:           usize,
    pub batch_size:      usize,
    pub lr:              f64,
    pub latent_size:     usize,
    pub channels:        usize,
    pub validation_size: usize,
    pub validate_every:  usize,
    /// Write a reconstruction snapshot every this many validations (0 = never)
    pub image_every:     usize,
    pub seed:            u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_dir:        "MNIST_data".to_string(),
            log_dir:         "MNIST_CNN_autoencoder".to_string(),
            weights_dir:     "weights".to_string(),
            steps:           5500,
            batch_size:      100,
            lr:              1e-4,
            latent_size:     20,
            channels:        128,
            validation_size: 5000,
            validate_every:  10,
            image_every:     10,
            seed:            0,
        }
    }
}

/// What the CLI reports once a run is over
#[derive(Debug, Clone)]
pub struct TrainSummary {
    pub steps:           usize,
    pub epochs:          usize,
    pub final_test_loss: f64,
    pub best_val_loss:   f64,
    pub weight_files:    usize,
    pub elapsed:         Duration,
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end
    pub fn execute(&self) -> Result<TrainSummary> {
        let started = Instant::now();
        let cfg = &self.config;

        // ── Step 1: Load the digit files (fails fast if missing) ──────────────
        tracing::info!("Loading IDX files from '{}'", cfg.data_dir);
        let loader = IdxLoader::new(&cfg.data_dir);
        let train_all = loader.load_train()?;
        let test = loader.load_test()?;
        tracing::info!("Loaded {} training and {} test images", train_all.len(), test.len());

        // ── Step 2: Validation is the head of the training file ───────────────
        let (train, validation) = split_train_val(train_all, cfg.validation_size);
        if validation.len() < cfg.validation_size {
            tracing::warn!(
                "Requested {} validation images but only {} were available",
                cfg.validation_size,
                validation.len()
            );
        }

        // ── Step 3: Burn datasets ─────────────────────────────────────────────
        let train      = DigitDataset::new(train);
        let validation = DigitDataset::new(validation);
        let test       = DigitDataset::new(test);

        // ── Step 4: Persist the config before the long part starts ────────────
        let ckpt = CheckpointManager::new(&cfg.weights_dir)?;
        ckpt.save_config(cfg)?;
        let metrics = MetricsLogger::new(&cfg.log_dir)?;

        // ── Step 5: Train ─────────────────────────────────────────────────────
        let report = run_training(cfg, train, validation, test, &metrics)?;

        // ── Step 6: Export ────────────────────────────────────────────────────
        let weight_files = ckpt.export_weights(&report.model)?;
        ckpt.save_model(&report.model)?;
        tracing::info!(
            "Wrote {} weight dumps and checkpoint to '{}'",
            weight_files.len(),
            ckpt.dir().display()
        );

        Ok(TrainSummary {
            steps:           report.steps,
            epochs:          report.epochs,
            final_test_loss: report.final_test_loss,
            best_val_loss:   report.best_val_loss,
            weight_files:    weight_files.len(),
            elapsed:         started.elapsed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_run() {
        let cfg = TrainConfig::default();
        assert_eq!(cfg.steps, 5500);
        assert_eq!(cfg.batch_size, 100);
        assert_eq!(cfg.validation_size, 5000);
        assert_eq!(cfg.validate_every, 10);
        assert!((cfg.lr - 1e-4).abs() < 1e-12);
        assert_eq!(cfg.data_dir, "MNIST_data");
    }

    #[test]
    fn test_missing_data_dir_fails_before_training() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = TrainConfig {
            data_dir:    dir.path().join("absent").to_string_lossy().into_owned(),
            weights_dir: dir.path().join("weights").to_string_lossy().into_owned(),
            log_dir:     dir.path().join("logs").to_string_lossy().into_owned(),
            ..TrainConfig::default()
        };
        let err = TrainUseCase::new(cfg).execute().unwrap_err();
        assert!(format!("{err:#}").contains("train-images-idx3-ubyte"));
        assert!(!dir.path().join("weights").exists());
    }
}
