// ============================================================
// Layer 2 - Application / Use Cases
// ============================================================
// Orchestrates the other layers to accomplish one goal each:
// training the autoencoder or writing a directory of plates.
//
// Rules for this layer:
//   - No ML math or raster code here
//   - No printing here (that's Layer 1)
//   - Only workflow coordination

/// The autoencoder training workflow
pub mod train_use_case;

/// The synthetic plate workflow
pub mod plate_use_case;
