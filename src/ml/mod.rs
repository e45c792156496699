// ============================================================
// Layer 5 - ML / Model Layer (Burn)
// ============================================================
// All autoencoder code that depends on Burn's module system:
//
//   model.rs    - conv encoder, dense bottleneck, dense decoder
//
//   session.rs  - TrainingSession: the explicit context that owns
//                 device, model and optimiser for one run
//
//   trainer.rs  - fixed-step training loop with periodic
//                 validation and a chunked final test pass
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)

/// Convolutional autoencoder architecture
pub mod model;

/// Open / step / evaluate / close around one training run
pub mod session;

/// Training loop with validation logging
pub mod trainer;
