// ============================================================
// Layer 6 - Checkpoint Manager
// ============================================================
// Persists a finished training run.
//
// What gets written:
//   1. autoencoder.mpk       - all parameters at full precision
//   2. train_config.json     - hyperparameters needed to rebuild
//                              the same architecture before loading
//   3. W_<layer>.json        - one plain-JSON dump per learned weight
//                              tensor (shape + row-major values),
//                              readable without Burn
//
// Layout:
//   weights/
//     autoencoder.mpk
//     train_config.json
//     W_conv1.json
//     W_conv2.json
//     W_conv3.json
//     W_flat_to_latent.json
//     W_latent_to_decoder.json
//     W_decoder_1_to_2.json
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use burn::{
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder},
};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::Autoencoder;

const MODEL_FILE: &str = "autoencoder";
const CONFIG_FILE: &str = "train_config.json";

/// f32 MessagePack, so a reload reproduces the trained weights exactly
type CheckpointRecorder = NamedMpkFileRecorder<FullPrecisionSettings>;

/// One learned weight tensor flattened for export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightDump {
    pub name:   String,
    pub shape:  Vec<usize>,
    pub values: Vec<f32>,
}

impl WeightDump {
    fn from_tensor<B: Backend, const D: usize>(name: &str, tensor: Tensor<B, D>) -> Result<Self> {
        let shape = tensor.dims().to_vec();
        let values = tensor
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| anyhow::anyhow!("Cannot read weights of {name}: {e:?}"))?;
        Ok(Self { name: name.to_string(), shape, values })
    }

    /// Number of scalars the shape implies
    pub fn numel(&self) -> usize {
        self.shape.iter().product()
    }
}

/// Reads and writes everything a training run leaves behind.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Creates the directory if it does not exist yet.
    pub fn new(dir: impl Into<String>) -> Result<Self> {
        let dir = PathBuf::from(dir.into());
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create weights directory '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    /// Save all parameters as full-precision MessagePack.
    pub fn save_model<B: Backend>(&self, model: &Autoencoder<B>) -> Result<PathBuf> {
        let path = self.dir.join(MODEL_FILE);

        CheckpointRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))?;

        tracing::debug!("Saved checkpoint to '{}'", path.display());
        Ok(path)
    }

    /// Restore parameters into a model with the same architecture.
    pub fn load_model<B: Backend>(
        &self,
        model:  Autoencoder<B>,
        device: &B::Device,
    ) -> Result<Autoencoder<B>> {
        let path = self.dir.join(MODEL_FILE);
        let record = CheckpointRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!("Cannot load checkpoint '{}'. Have you run 'train' first?", path.display())
            })?;
        Ok(model.load_record(record))
    }

    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join(CONFIG_FILE);
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read config from '{}'", path.display()))?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Write the six learned weight matrices, one JSON file each.
    /// Biases stay in the MessagePack checkpoint only.
    pub fn export_weights<B: Backend>(&self, model: &Autoencoder<B>) -> Result<Vec<PathBuf>> {
        let dumps = [
            WeightDump::from_tensor("W_conv1", model.conv1.weight.val())?,
            WeightDump::from_tensor("W_conv2", model.conv2.weight.val())?,
            WeightDump::from_tensor("W_conv3", model.conv3.weight.val())?,
            WeightDump::from_tensor("W_flat_to_latent", model.flat_to_latent.weight.val())?,
            WeightDump::from_tensor("W_latent_to_decoder", model.latent_to_decoder.weight.val())?,
            WeightDump::from_tensor("W_decoder_1_to_2", model.decoder_1_to_2.weight.val())?,
        ];

        let mut written = Vec::with_capacity(dumps.len());
        for dump in &dumps {
            let path = self.dir.join(format!("{}.json", dump.name));
            let json = serde_json::to_string(dump)?;
            fs::write(&path, json)
                .with_context(|| format!("Cannot write weights to '{}'", path.display()))?;
            tracing::debug!("Exported {} {:?}", dump.name, dump.shape);
            written.push(path);
        }
        Ok(written)
    }

    /// Read back one exported weight tensor by name.
    pub fn load_weights(&self, name: &str) -> Result<WeightDump> {
        let path = self.dir.join(format!("{name}.json"));
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read weights from '{}'", path.display()))?;
        Ok(serde_json::from_str(&json)?)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    use crate::ml::model::AutoencoderConfig;

    fn small_model() -> Autoencoder<NdArray> {
        AutoencoderConfig::new()
            .with_channels(2)
            .with_latent_size(3)
            .init(&Default::default())
    }

    fn manager(dir: &tempfile::TempDir) -> CheckpointManager {
        CheckpointManager::new(dir.path().to_str().unwrap()).unwrap()
    }

    #[test]
    fn test_export_writes_six_dumps() {
        let dir = tempfile::tempdir().unwrap();
        let ckpt = manager(&dir);
        let paths = ckpt.export_weights(&small_model()).unwrap();
        assert_eq!(paths.len(), 6);
        assert!(paths.iter().all(|p| p.exists()));

        let conv1 = ckpt.load_weights("W_conv1").unwrap();
        assert_eq!(conv1.shape, vec![2, 1, 3, 3]);
        assert_eq!(conv1.values.len(), conv1.numel());

        let bottleneck = ckpt.load_weights("W_flat_to_latent").unwrap();
        assert_eq!(bottleneck.shape, vec![2 * 28 * 28, 3]);
    }

    #[test]
    fn test_config_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let ckpt = manager(&dir);
        let cfg = TrainConfig { steps: 42, latent_size: 7, ..TrainConfig::default() };
        ckpt.save_config(&cfg).unwrap();

        let loaded = ckpt.load_config().unwrap();
        assert_eq!(loaded.steps, 42);
        assert_eq!(loaded.latent_size, 7);
    }

    #[test]
    fn test_model_checkpoint_restores_weights() {
        let dir = tempfile::tempdir().unwrap();
        let ckpt = manager(&dir);
        let model = small_model();
        ckpt.save_model(&model).unwrap();

        let restored = ckpt.load_model(small_model(), &Default::default()).unwrap();
        let before: Vec<f32> = model.conv1.weight.val().into_data().to_vec().unwrap();
        let after: Vec<f32> = restored.conv1.weight.val().into_data().to_vec().unwrap();
        assert_eq!(before, after);

        // Biases live only in the checkpoint; they must survive bit for bit too
        let bias = |m: &Autoencoder<NdArray>| -> Vec<f32> {
            m.decoder_1_to_2.bias.as_ref().unwrap().val().into_data().to_vec().unwrap()
        };
        assert_eq!(bias(&model), bias(&restored));
        assert!(dir.path().join("autoencoder.mpk").exists());
    }

    #[test]
    fn test_missing_checkpoint_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = manager(&dir).load_model(small_model(), &Default::default());
        assert!(err.is_err());
    }
}
