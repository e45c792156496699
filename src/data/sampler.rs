// ============================================================
// Layer 4 - Epoch Sampler
// ============================================================
// Hands out fixed-size batches of dataset indices for a training
// loop that runs a fixed number of steps rather than a fixed
// number of epochs.
//
// When the next batch would run past the end of the current
// ordering, the epoch counter advances and the ordering is
// reshuffled with the caller's RNG. Every index therefore appears
// at most once per epoch, and exactly once when the dataset length
// is a multiple of the batch size.

use rand::{seq::SliceRandom, Rng};

#[derive(Debug, Clone)]
pub struct EpochSampler {
    order:      Vec<usize>,
    cursor:     usize,
    batch_size: usize,
    epoch:      usize,
}

impl EpochSampler {
    /// Sampler over `len` items. The first epoch is shuffled too.
    /// `batch_size` is clamped to [1, len].
    pub fn new<R: Rng + ?Sized>(len: usize, batch_size: usize, rng: &mut R) -> Self {
        let mut order: Vec<usize> = (0..len).collect();
        order.shuffle(rng);
        Self {
            order,
            cursor: 0,
            batch_size: batch_size.clamp(1, len.max(1)),
            epoch: 0,
        }
    }

    /// Next batch of indices. Empty only when the sampler is empty.
    pub fn next_batch<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<usize> {
        if self.order.is_empty() {
            return Vec::new();
        }
        if self.cursor + self.batch_size > self.order.len() {
            self.epoch += 1;
            self.cursor = 0;
            self.order.shuffle(rng);
            tracing::debug!("Sampler reshuffled for epoch {}", self.epoch);
        }
        let batch = self.order[self.cursor..self.cursor + self.batch_size].to_vec();
        self.cursor += self.batch_size;
        batch
    }

    /// Completed reshuffles so far
    pub fn epoch(&self) -> usize {
        self.epoch
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Whole batches per epoch (at least one for a non-empty sampler)
    pub fn steps_per_epoch(&self) -> usize {
        (self.order.len() / self.batch_size).max(1)
    }
}
