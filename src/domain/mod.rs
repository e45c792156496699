// ============================================================
// Layer 3 - Domain Layer
// ============================================================
// Plain Rust types and traits shared by both pipelines.
//
// Rules for this layer:
//   - NO Burn framework types
//   - NO file I/O
//   - Only structs, enums, traits and their invariants

/// Typed errors for plates and datasets
pub mod error;

/// Symbol classes and plate templates
pub mod symbol;

/// A single rasterised character
pub mod glyph;

/// A single handwritten-digit sample
pub mod digit;

/// Rasterizer and dataset abstractions
pub mod traits;
