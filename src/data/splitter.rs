// ============================================================
// Layer 4 - Train/Validation Splitter
// ============================================================
// Carves a validation set off the front of the training split:
//   - Validation set: the first `validation_size` samples
//   - Training set:   everything after them
//
// The split is positional, not shuffled, so the same files always
// give the same validation set (MNIST: 55000 train / 5000 validation).
// Shuffling happens later, per epoch, in the EpochSampler.

/// Split `samples` into (train, validation).
pub fn split_train_val<T>(mut samples: Vec<T>, validation_size: usize) -> (Vec<T>, Vec<T>) {
    let total    = samples.len();
    let split_at = validation_size.min(total);

    // split_off(n) leaves [0..n] in `samples` and returns [n..]
    let train = samples.split_off(split_at);

    tracing::debug!(
        "Dataset split: {} training, {} validation",
        train.len(),
        samples.len(),
    );

    (train, samples)
}
