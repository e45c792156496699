use burn::data::dataset::Dataset;

use crate::domain::digit::DigitImage;

/// In-memory digit split, exposed to Burn through the Dataset trait.
pub struct DigitDataset {
    samples: Vec<DigitImage>,
}

impl DigitDataset {
    pub fn new(samples: Vec<DigitImage>) -> Self { Self { samples } }

    pub fn sample_count(&self) -> usize { self.samples.len() }

    /// Items at `indices`, skipping any that are out of range
    pub fn gather(&self, indices: &[usize]) -> Vec<DigitImage> {
        indices.iter().filter_map(|&i| self.get(i)).collect()
    }

    /// Consecutive slices of at most `chunk_size` items
    pub fn chunks(&self, chunk_size: usize) -> impl Iterator<Item = &[DigitImage]> {
        self.samples.chunks(chunk_size.max(1))
    }
}

impl Dataset<DigitImage> for DigitDataset {
    fn get(&self, index: usize) -> Option<DigitImage> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
