// ============================================================
// Layer 5 - Training Session
// ============================================================
// The explicit context object for one training run. It owns the
// model and the optimiser state for as long as training lasts:
//
//   open()        → build the model on the device
//   train_step()  → forward, backward, optimiser update
//   evaluate()    → loss + reconstructions without autodiff
//   close()       → release optimiser state, return the trained
//                   model on the inner (non-autodiff) backend
//
// Nothing here is global: two sessions can run side by side.

use burn::{
    module::AutodiffModule,
    optim::{GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::data::batcher::ImageBatch;
use crate::ml::model::{Autoencoder, AutoencoderConfig};

/// Result of a validation or test pass
pub struct Evaluation<B: Backend> {
    pub loss:            f64,
    pub reconstructions: Tensor<B, 4>,
}

pub struct TrainingSession<B, O>
where
    B: AutodiffBackend,
    O: Optimizer<Autoencoder<B>, B>,
{
    model:  Autoencoder<B>,
    optim:  O,
    lr:     f64,
    steps:  usize,
}

impl<B, O> TrainingSession<B, O>
where
    B: AutodiffBackend,
    O: Optimizer<Autoencoder<B>, B>,
{
    pub fn open(config: &AutoencoderConfig, optim: O, lr: f64, device: B::Device) -> Self {
        let model = config.init::<B>(&device);
        tracing::info!(
            "Training session opened: channels={}, latent={}, lr={}",
            config.channels,
            config.latent_size,
            lr
        );
        Self { model, optim, lr, steps: 0 }
    }

    /// One Adam update on `batch`; returns the pre-update loss.
    pub fn train_step(&mut self, batch: ImageBatch<B>) -> f64 {
        let (loss, _) = self.model.forward_loss(batch.images);
        let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();

        let grads = loss.backward();
        let grads = GradientsParams::from_grads(grads, &self.model);
        self.model = self.optim.step(self.lr, self.model.clone(), grads);
        self.steps += 1;

        loss_val
    }

    /// Loss on `batch` with the current weights, no gradients tracked.
    pub fn evaluate(&self, batch: ImageBatch<B::InnerBackend>) -> Evaluation<B::InnerBackend> {
        let model = self.model.valid();
        let (loss, reconstructions) = model.forward_loss(batch.images);
        Evaluation {
            loss: loss.into_scalar().elem::<f64>(),
            reconstructions,
        }
    }

    /// Optimiser updates applied so far
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Tear the session down and hand back the trained weights.
    pub fn close(self) -> Autoencoder<B::InnerBackend> {
        tracing::info!("Training session closed after {} steps", self.steps);
        self.model.valid()
    }
}
