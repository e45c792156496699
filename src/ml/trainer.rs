// ============================================================
// Layer 5 - Training Loop
// ============================================================
// Fixed-step mini-batch training for the autoencoder.
//
//   - Training uses TrainBackend (Autodiff<Wgpu>) for gradients
//   - Validation and test passes run on the inner backend
//   - One "epoch" is train_len / batch_size steps; the sampler
//     reshuffles the training order at every epoch boundary
//   - Every `validate_every` steps the next validation batch is
//     scored and the loss is appended to the metrics log
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::{bail, Result};
use burn::{
    data::dataloader::batcher::Batcher,
    optim::AdamConfig,
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::ImageBatcher, dataset::DigitDataset, sampler::EpochSampler};
use crate::infra::metrics::{MetricsLogger, StepMetrics};
use crate::ml::model::{Autoencoder, AutoencoderConfig};
use crate::ml::session::TrainingSession;

type TrainBackend = burn::backend::Autodiff<burn::backend::Wgpu>;

/// Test images are scored in chunks of this size
pub const TEST_CHUNK: usize = 1000;

/// Number of sample pairs written per image snapshot
const SNAPSHOT_IMAGES: usize = 3;

/// Outcome of a completed run
pub struct TrainReport<B: Backend> {
    pub model:            Autoencoder<B>,
    pub steps:            usize,
    pub epochs:           usize,
    pub final_test_loss:  f64,
    pub best_val_loss:    f64,
}

pub fn run_training(
    cfg:        &TrainConfig,
    train:      DigitDataset,
    validation: DigitDataset,
    test:       DigitDataset,
    metrics:    &MetricsLogger,
) -> Result<TrainReport<burn::backend::Wgpu>> {
    let device = burn::backend::wgpu::WgpuDevice::default();
    tracing::info!("Using WGPU device: {:?}", device);
    train_loop::<TrainBackend>(cfg, train, validation, test, metrics, device)
}

pub fn train_loop<B: AutodiffBackend>(
    cfg:        &TrainConfig,
    train:      DigitDataset,
    validation: DigitDataset,
    test:       DigitDataset,
    metrics:    &MetricsLogger,
    device:     B::Device,
) -> Result<TrainReport<B::InnerBackend>> {
    if train.sample_count() == 0 {
        bail!("Training split is empty");
    }
    if validation.sample_count() == 0 {
        bail!("Validation split is empty; lower --validation-size or add data");
    }
    if cfg.batch_size == 0 || cfg.validate_every == 0 {
        bail!("batch_size and validate_every must be positive");
    }

    // ── Session (model + Adam) ────────────────────────────────────────────────
    let model_cfg = AutoencoderConfig::new()
        .with_channels(cfg.channels)
        .with_latent_size(cfg.latent_size);
    let optim = AdamConfig::new()
        .with_epsilon(1e-8)
        .init::<B, Autoencoder<B>>();
    let mut session = TrainingSession::open(&model_cfg, optim, cfg.lr, device.clone());

    // ── Samplers share one seeded stream ──────────────────────────────────────
    let mut rng = ChaCha8Rng::seed_from_u64(cfg.seed);
    let mut train_sampler = EpochSampler::new(train.sample_count(), cfg.batch_size, &mut rng);
    let mut val_sampler   = EpochSampler::new(validation.sample_count(), cfg.batch_size, &mut rng);
    let steps_per_epoch   = train_sampler.steps_per_epoch();

    let train_batcher = ImageBatcher::<B>::new(device.clone());
    let eval_batcher  = ImageBatcher::<B::InnerBackend>::new(device);

    tracing::info!(
        "Training {} steps, batch {}, {} steps per epoch ({} train / {} validation)",
        cfg.steps,
        train_sampler.batch_size(),
        steps_per_epoch,
        train.sample_count(),
        validation.sample_count(),
    );

    let mut best_val_loss = f64::INFINITY;
    let mut validations   = 0usize;

    for step in 0..cfg.steps {
        if step % steps_per_epoch == 0 {
            tracing::info!("Epoch {}", step / steps_per_epoch);
        }

        // ── Validation ────────────────────────────────────────────────────────
        if step % cfg.validate_every == 0 {
            let items = validation.gather(&val_sampler.next_batch(&mut rng));
            let eval  = session.evaluate(eval_batcher.batch(items.clone()));

            let record = StepMetrics::new(step, step / steps_per_epoch, eval.loss);
            if record.is_improvement(best_val_loss) {
                best_val_loss = eval.loss;
            }
            metrics.log(&record)?;
            tracing::info!("STEP {} validation {:.6}", step, eval.loss);

            if cfg.image_every > 0 && validations % cfg.image_every == 0 {
                let shown = items.len().min(SNAPSHOT_IMAGES);
                let recon = tensor_to_vec(eval.reconstructions)?;
                let pixels = recon.len() / items.len().max(1);
                let inputs: Vec<&[f32]> = items[..shown].iter().map(|d| d.pixels.as_slice()).collect();
                let outputs: Vec<&[f32]> = recon.chunks(pixels.max(1)).take(shown).collect();
                metrics.write_snapshot(step, &inputs, &outputs)?;
            }
            validations += 1;
        }

        // ── Training step ─────────────────────────────────────────────────────
        let items = train.gather(&train_sampler.next_batch(&mut rng));
        let loss  = session.train_step(train_batcher.batch(items));
        tracing::debug!("step {} train_loss={:.6}", step, loss);
    }

    let epochs = train_sampler.epoch() + 1;
    let model  = session.close();

    // ── Final test loss in fixed-size chunks ──────────────────────────────────
    let final_test_loss = test_loss(&model, &test, &eval_batcher);
    tracing::info!("final loss {:.6}", final_test_loss);

    Ok(TrainReport {
        model,
        steps: cfg.steps,
        epochs,
        final_test_loss,
        best_val_loss,
    })
}

/// Mean of the per-chunk losses over the whole split.
/// NaN when the split is empty.
pub fn test_loss<B: Backend>(
    model:   &Autoencoder<B>,
    dataset: &DigitDataset,
    batcher: &ImageBatcher<B>,
) -> f64 {
    let losses: Vec<f64> = dataset
        .chunks(TEST_CHUNK)
        .map(|chunk| {
            let batch = batcher.batch(chunk.to_vec());
            let (loss, _) = model.forward_loss(batch.images);
            loss.into_scalar().elem::<f64>()
        })
        .collect();

    if losses.is_empty() {
        f64::NAN
    } else {
        losses.iter().sum::<f64>() / losses.len() as f64
    }
}

fn tensor_to_vec<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> Result<Vec<f32>> {
    tensor
        .into_data()
        .to_vec::<f32>()
        .map_err(|e| anyhow::anyhow!("Cannot read tensor data: {e:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};

    use crate::domain::digit::{DigitImage, IMAGE_PIXELS};

    fn digits(n: usize, offset: usize) -> DigitDataset {
        DigitDataset::new(
            (0..n)
                .map(|i| {
                    let pixels = (0..IMAGE_PIXELS)
                        .map(|p| ((p * (i + offset + 1)) % 11) as f32 / 11.0)
                        .collect();
                    DigitImage::new(pixels, (i % 10) as u8)
                })
                .collect(),
        )
    }

    fn tiny_config(log_dir: &str) -> TrainConfig {
        TrainConfig {
            log_dir:        log_dir.to_string(),
            steps:          5,
            batch_size:     2,
            lr:             1e-3,
            latent_size:    3,
            channels:       2,
            validate_every: 2,
            image_every:    1,
            ..TrainConfig::default()
        }
    }

    #[test]
    fn test_tiny_run_logs_and_reports() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().to_str().unwrap();
        let cfg = tiny_config(log_dir);
        let metrics = MetricsLogger::new(log_dir).unwrap();

        let report = train_loop::<Autodiff<NdArray>>(
            &cfg,
            digits(6, 0),
            digits(2, 10),
            digits(3, 20),
            &metrics,
            Default::default(),
        )
        .unwrap();

        assert_eq!(report.steps, 5);
        // 6 samples / batch 2 → 3 steps per epoch; 5 steps → 2 epochs
        assert_eq!(report.epochs, 2);
        assert!(report.final_test_loss.is_finite());
        assert!(report.best_val_loss.is_finite());

        // validations at steps 0, 2, 4
        let csv = std::fs::read_to_string(metrics.csv_path()).unwrap();
        assert_eq!(csv.lines().count(), 4);
        assert!(dir.path().join("samples_step_00004.png").exists());
    }

    #[test]
    fn test_empty_validation_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().to_str().unwrap();
        let metrics = MetricsLogger::new(log_dir).unwrap();
        let result = train_loop::<Autodiff<NdArray>>(
            &tiny_config(log_dir),
            digits(4, 0),
            digits(0, 0),
            digits(1, 0),
            &metrics,
            Default::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_loss_of_empty_split_is_nan() {
        let device = Default::default();
        let model: Autoencoder<NdArray> = AutoencoderConfig::new()
            .with_channels(1)
            .with_latent_size(2)
            .init(&device);
        let batcher = ImageBatcher::<NdArray>::new(device);
        assert!(test_loss(&model, &digits(0, 0), &batcher).is_nan());
    }
}
