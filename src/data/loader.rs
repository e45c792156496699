// ============================================================
// Layer 4 - IDX Dataset Loader
// ============================================================
// Loads the MNIST digit files from a local directory.
//
// IDX format (all integers big-endian):
//   images: magic 0x00000803 | count | rows | cols | count*rows*cols bytes
//   labels: magic 0x00000801 | count | count bytes
//
// Each file may also be stored gzipped with a ".gz" suffix, which
// is how the dataset is usually distributed. The plain file wins
// if both exist.
//
// Reference: http://yann.lecun.com/exdb/mnist/

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use std::{
    fs,
    io::Read,
    path::{Path, PathBuf},
};

use crate::domain::{
    digit::{DigitImage, IMAGE_SIDE},
    error::DatasetError,
    traits::DigitSource,
};

const IMAGE_MAGIC: u32 = 0x0000_0803;
const LABEL_MAGIC: u32 = 0x0000_0801;

pub const TRAIN_IMAGES: &str = "train-images-idx3-ubyte";
pub const TRAIN_LABELS: &str = "train-labels-idx1-ubyte";
pub const TEST_IMAGES: &str = "t10k-images-idx3-ubyte";
pub const TEST_LABELS: &str = "t10k-labels-idx1-ubyte";

/// Decoded image file: `count` images of `rows` x `cols` bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdxImages {
    pub count: usize,
    pub rows:  usize,
    pub cols:  usize,
    pub data:  Vec<u8>,
}

/// Loads digit splits from a directory of IDX files.
pub struct IdxLoader {
    dir: PathBuf,
}

impl IdxLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn load_pair(&self, images_name: &str, labels_name: &str) -> Result<Vec<DigitImage>> {
        let images = parse_images(&read_idx_file(&self.dir, images_name)?)
            .with_context(|| format!("Malformed image file '{images_name}'"))?;
        let labels = parse_labels(&read_idx_file(&self.dir, labels_name)?)
            .with_context(|| format!("Malformed label file '{labels_name}'"))?;

        if images.count != labels.len() {
            return Err(DatasetError::LabelMismatch {
                images: images.count,
                labels: labels.len(),
            }
            .into());
        }
        if images.rows != IMAGE_SIDE || images.cols != IMAGE_SIDE {
            return Err(DatasetError::UnsupportedShape {
                rows: images.rows,
                cols: images.cols,
            }
            .into());
        }

        let pixels = images.rows * images.cols;
        let digits: Vec<DigitImage> = images
            .data
            .chunks_exact(pixels)
            .zip(labels)
            .map(|(raw, label)| DigitImage::from_bytes(raw, label))
            .collect();

        tracing::debug!("Loaded {} digits from '{}'", digits.len(), images_name);
        Ok(digits)
    }
}

impl DigitSource for IdxLoader {
    fn load_train(&self) -> Result<Vec<DigitImage>> {
        self.load_pair(TRAIN_IMAGES, TRAIN_LABELS)
    }

    fn load_test(&self) -> Result<Vec<DigitImage>> {
        self.load_pair(TEST_IMAGES, TEST_LABELS)
    }
}

/// Read `name` from `dir`, falling back to `name.gz`.
fn read_idx_file(dir: &Path, name: &str) -> Result<Vec<u8>> {
    let plain = dir.join(name);
    if plain.exists() {
        return fs::read(&plain)
            .with_context(|| format!("Cannot read dataset file '{}'", plain.display()));
    }

    let gz = dir.join(format!("{name}.gz"));
    let file = fs::File::open(&gz).with_context(|| {
        format!(
            "Cannot find dataset file '{}' (or '{}')",
            plain.display(),
            gz.display()
        )
    })?;
    let mut bytes = Vec::new();
    GzDecoder::new(file)
        .read_to_end(&mut bytes)
        .with_context(|| format!("Cannot decompress '{}'", gz.display()))?;
    Ok(bytes)
}

fn read_u32(bytes: &[u8], offset: usize) -> Result<u32, DatasetError> {
    bytes
        .get(offset..offset + 4)
        .and_then(|b| b.try_into().ok())
        .map(u32::from_be_bytes)
        .ok_or(DatasetError::Truncated {
            expected: offset + 4,
            found:    bytes.len(),
        })
}

fn check_magic(bytes: &[u8], expected: u32) -> Result<(), DatasetError> {
    let found = read_u32(bytes, 0)?;
    if found != expected {
        return Err(DatasetError::BadMagic { expected, found });
    }
    Ok(())
}

/// Decode an IDX3 image file.
pub fn parse_images(bytes: &[u8]) -> Result<IdxImages, DatasetError> {
    check_magic(bytes, IMAGE_MAGIC)?;
    let count = read_u32(bytes, 4)? as usize;
    let rows = read_u32(bytes, 8)? as usize;
    let cols = read_u32(bytes, 12)? as usize;

    let expected = count
        .checked_mul(rows)
        .and_then(|n| n.checked_mul(cols))
        .and_then(|n| n.checked_add(16))
        .ok_or(DatasetError::Truncated { expected: usize::MAX, found: bytes.len() })?;
    if bytes.len() < expected {
        return Err(DatasetError::Truncated { expected, found: bytes.len() });
    }

    Ok(IdxImages {
        count,
        rows,
        cols,
        data: bytes[16..expected].to_vec(),
    })
}

/// Decode an IDX1 label file.
pub fn parse_labels(bytes: &[u8]) -> Result<Vec<u8>, DatasetError> {
    check_magic(bytes, LABEL_MAGIC)?;
    let count = read_u32(bytes, 4)? as usize;

    let expected = count
        .checked_add(8)
        .ok_or(DatasetError::Truncated { expected: usize::MAX, found: bytes.len() })?;
    if bytes.len() < expected {
        return Err(DatasetError::Truncated { expected, found: bytes.len() });
    }
    Ok(bytes[8..expected].to_vec())
}
