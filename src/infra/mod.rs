// ============================================================
// Layer 6 - Infrastructure Layer
// ============================================================
// Everything that touches the filesystem on behalf of the
// other layers:
//
//   checkpoint.rs  - MessagePack checkpoint, train_config.json
//                    and the per-layer JSON weight dumps
//
//   metrics.rs     - validation loss CSV and reconstruction
//                    sample PNGs for the training log directory
//
//   font_store.rs  - reads the plate font and builds the
//                    rasterizer for a given glyph height
//
// Reference: Rust Book §7 (Modules)
//            Burn Book §5 (Checkpointing)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Training metrics CSV and sample images
pub mod metrics;

/// Font file loading
pub mod font_store;
