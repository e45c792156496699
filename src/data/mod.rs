// ============================================================
// Layer 4 - Data Pipeline
// ============================================================
// Everything from IDX files on disk to tensor batches:
//
//   IDX files (.gz optional)
//       │
//       ▼
//   IdxLoader      → decodes images + labels into DigitImages
//       │
//       ▼
//   splitter       → validation head / training tail
//       │
//       ▼
//   DigitDataset   → implements Burn's Dataset trait
//       │
//       ▼
//   EpochSampler   → index batches, reshuffled every epoch
//       │
//       ▼
//   ImageBatcher   → stacks samples into [N, 1, 28, 28] tensors
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Reads MNIST IDX files from a directory
pub mod loader;

/// Implements Burn's Dataset trait for digit images
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Fixed-size index batches with per-epoch reshuffling
pub mod sampler;

/// Splits the training file into train/validation sets
pub mod splitter;
