// ============================================================
// Layer 4 - Image Batcher
// ============================================================
// Implements Burn's Batcher trait to stack DigitImages into one
// NCHW tensor.
//
//   Input:  Vec of N DigitImages, 784 pixels each
//   Output: ImageBatch with images [N, 1, 28, 28] and labels [N]
//
// Pixels are flattened sample after sample, then reshaped:
//   [s1_p1 .. s1_p784, s2_p1 .. sN_p784] -> [N, 1, 28, 28]
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::domain::digit::{DigitImage, IMAGE_SIDE};

/// A batch of digits ready for the autoencoder forward pass.
#[derive(Debug, Clone)]
pub struct ImageBatch<B: Backend> {
    /// Shape: [batch_size, 1, 28, 28]
    pub images: Tensor<B, 4>,

    /// Shape: [batch_size]
    pub labels: Tensor<B, 1, Int>,
}

/// Holds the target device so tensors land on the right GPU/CPU.
#[derive(Clone, Debug)]
pub struct ImageBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> ImageBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<DigitImage, ImageBatch<B>> for ImageBatcher<B> {
    fn batch(&self, items: Vec<DigitImage>) -> ImageBatch<B> {
        let batch_size = items.len();

        let pixels: Vec<f32> = items
            .iter()
            .flat_map(|d| d.pixels.iter().copied())
            .collect();

        let labels: Vec<i32> = items
            .iter()
            .map(|d| i32::from(d.label))
            .collect();

        let images = Tensor::<B, 1>::from_floats(pixels.as_slice(), &self.device)
            .reshape([batch_size, 1, IMAGE_SIDE, IMAGE_SIDE]);

        let labels = Tensor::<B, 1, Int>::from_ints(labels.as_slice(), &self.device);

        ImageBatch { images, labels }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::digit::IMAGE_PIXELS;
    use burn::backend::NdArray;

    #[test]
    fn test_batch_shapes() {
        let batcher = ImageBatcher::<NdArray>::new(Default::default());
        let items = (0..3)
            .map(|i| DigitImage::new(vec![i as f32 / 10.0; IMAGE_PIXELS], i))
            .collect();
        let batch = batcher.batch(items);
        assert_eq!(batch.images.dims(), [3, 1, IMAGE_SIDE, IMAGE_SIDE]);
        assert_eq!(batch.labels.dims(), [3]);
    }
}
