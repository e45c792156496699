// ============================================================
// Layer 3 - Domain Errors
// ============================================================
// Typed failures for the plate generator and the digit dataset.
// The application layer wraps these in anyhow with file context.

use thiserror::Error;

/// Failures raised while building an atlas, sampling codes or
/// compositing plates.
#[derive(Debug, Error)]
pub enum PlateError {
    /// The atlas or compositor was asked for something degenerate,
    /// e.g. a zero glyph height or a font whose glyphs have no width.
    #[error("invalid plate configuration: {0}")]
    Config(String),

    /// A template character that is not one of the known class tags.
    #[error("unknown symbol class '{tag}' at template position {position}")]
    UnknownSymbolClass { tag: char, position: usize },

    #[error("template must contain at least one symbol class")]
    EmptyTemplate,

    #[error("plate code must contain at least one symbol")]
    EmptyCode,

    /// The code contains a symbol the atlas was never built for.
    #[error("no glyph for symbol {0:?} in the character atlas")]
    MissingGlyph(char),

    #[error("cannot parse font: {0}")]
    FontLoad(String),
}

/// Failures raised while decoding IDX image/label files.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DatasetError {
    #[error("bad IDX magic number: expected {expected:#010x}, found {found:#010x}")]
    BadMagic { expected: u32, found: u32 },

    #[error("IDX payload truncated: expected {expected} bytes, found {found}")]
    Truncated { expected: usize, found: usize },

    #[error("image file holds {images} items but label file holds {labels}")]
    LabelMismatch { images: usize, labels: usize },

    #[error("unsupported image shape {rows}x{cols}")]
    UnsupportedShape { rows: usize, cols: usize },
}
