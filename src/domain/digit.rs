// ============================================================
// Layer 3 - Digit Image Domain Type
// ============================================================
// One handwritten-digit sample: 28x28 grey pixels scaled to [0, 1]
// plus its class label. The autoencoder ignores the label but it
// is kept so the same samples can feed a classifier later.

use serde::{Deserialize, Serialize};

/// Side length of an MNIST image in pixels
pub const IMAGE_SIDE: usize = 28;

/// Number of pixels in one image
pub const IMAGE_PIXELS: usize = IMAGE_SIDE * IMAGE_SIDE;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigitImage {
    /// Row-major intensities, IMAGE_PIXELS long
    pub pixels: Vec<f32>,

    /// Digit class 0-9
    pub label: u8,
}

impl DigitImage {
    pub fn new(pixels: Vec<f32>, label: u8) -> Self {
        Self { pixels, label }
    }

    /// Build from raw 8-bit pixels as stored in IDX files
    pub fn from_bytes(raw: &[u8], label: u8) -> Self {
        Self {
            pixels: raw.iter().map(|&b| f32::from(b) / 255.0).collect(),
            label,
        }
    }
}
