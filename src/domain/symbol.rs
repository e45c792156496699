// ============================================================
// Layer 3 - Symbol Classes and Templates
// ============================================================
// A template such as "LLDDSLLL" describes the shape of a plate
// code. Every tag binds one class, and every class binds a fixed
// character set:
//
//   L -> letters A-Z          D -> digits 0-9
//   S -> ' '  (normal space)  X -> 'd' (double space)
//   W -> 'w'  (wide space)    Q -> 'q' (quad space)
//
// The three wide-space symbols are not printable characters; the
// atlas builder derives their glyphs by stretching the space cell.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::domain::error::PlateError;

pub const LETTERS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const DIGITS: &str = "0123456789";

pub const SPACE: char = ' ';
pub const DOUBLE_SPACE: char = 'd';
pub const WIDE_SPACE: char = 'w';
pub const QUAD_SPACE: char = 'q';

/// Template used when the caller does not supply one
pub const DEFAULT_TEMPLATE: &str = "LLDDSLLL";

/// One position class of a plate template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolClass {
    Letter,
    Digit,
    Space,
    DoubleSpace,
    WideSpace,
    QuadSpace,
}

impl SymbolClass {
    /// Map a template tag to its class. Returns None for unknown tags.
    pub fn from_tag(tag: char) -> Option<Self> {
        match tag {
            'L' => Some(Self::Letter),
            'D' => Some(Self::Digit),
            'S' => Some(Self::Space),
            'X' => Some(Self::DoubleSpace),
            'W' => Some(Self::WideSpace),
            'Q' => Some(Self::QuadSpace),
            _   => None,
        }
    }

    pub fn tag(self) -> char {
        match self {
            Self::Letter      => 'L',
            Self::Digit       => 'D',
            Self::Space       => 'S',
            Self::DoubleSpace => 'X',
            Self::WideSpace   => 'W',
            Self::QuadSpace   => 'Q',
        }
    }

    /// The characters a position of this class may take.
    /// All sets are ASCII so they can be indexed by byte.
    pub fn charset(self) -> &'static str {
        match self {
            Self::Letter      => LETTERS,
            Self::Digit       => DIGITS,
            Self::Space       => " ",
            Self::DoubleSpace => "d",
            Self::WideSpace   => "w",
            Self::QuadSpace   => "q",
        }
    }

    pub fn contains(self, symbol: char) -> bool {
        self.charset().contains(symbol)
    }

    /// True for the four blank classes
    pub fn is_space(self) -> bool {
        !matches!(self, Self::Letter | Self::Digit)
    }
}

/// A parsed, non-empty sequence of symbol classes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Template {
    classes: Vec<SymbolClass>,
}

impl Template {
    /// Parse a tag string. Fails fast on the first unknown tag
    /// instead of skipping it.
    pub fn parse(tags: &str) -> Result<Self, PlateError> {
        if tags.is_empty() {
            return Err(PlateError::EmptyTemplate);
        }

        let classes = tags
            .chars()
            .enumerate()
            .map(|(position, tag)| {
                SymbolClass::from_tag(tag)
                    .ok_or(PlateError::UnknownSymbolClass { tag, position })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { classes })
    }

    pub fn classes(&self) -> &[SymbolClass] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// True if `code` has one symbol per position and every symbol
    /// belongs to the class bound to its position.
    pub fn matches(&self, code: &str) -> bool {
        code.chars().count() == self.classes.len()
            && code
                .chars()
                .zip(&self.classes)
                .all(|(symbol, class)| class.contains(symbol))
    }
}

impl Default for Template {
    fn default() -> Self {
        use SymbolClass::*;
        Self {
            classes: vec![Letter, Letter, Digit, Digit, Space, Letter, Letter, Letter],
        }
    }
}

impl FromStr for Template {
    type Err = PlateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.classes.iter().try_for_each(|c| write!(f, "{}", c.tag()))
    }
}
