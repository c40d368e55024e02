use serde::{Deserialize, Serialize};
use std::fmt;
use unicode_categories::UnicodeCategories;

/// A single normalized character of the source alphabet.
pub type Symbol = char;

/// Controls how raw text is reduced to symbols.
///
/// Whitespace is always removed. Everything else is decided here, once, when a
/// [`LetterStream`] is built; matching never folds case or skips punctuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Normalization {
    /// Lower-case every symbol
    pub case_fold: bool,
    /// Keep only Unicode letters (drops digits, punctuation, vowel points and
    /// cantillation marks)
    pub letters_only: bool,
}

impl Default for Normalization {
    fn default() -> Self {
        Self {
            case_fold: true,
            letters_only: true,
        }
    }
}

impl Normalization {
    /// Normalization that only strips whitespace
    pub fn verbatim() -> Self {
        Self {
            case_fold: false,
            letters_only: false,
        }
    }

    /// Reduces `text` to its symbols
    pub fn normalize(&self, text: &str) -> Vec<Symbol> {
        let mut symbols = Vec::with_capacity(text.len());
        for c in text.chars() {
            if c.is_whitespace() || (self.letters_only && !c.is_letter()) {
                continue;
            }
            if self.case_fold {
                symbols.extend(c.to_lowercase());
            } else {
                symbols.push(c);
            }
        }
        symbols
    }
}

/// Ordered, immutable sequence of symbols taken from a contiguous span of text.
///
/// No constructor lets whitespace through.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LetterStream {
    symbols: Vec<Symbol>,
}

impl LetterStream {
    pub fn new(text: &str, normalization: &Normalization) -> Self {
        Self {
            symbols: normalization.normalize(text),
        }
    }

    /// Builds a stream from consecutive words, as handed out by a text source
    pub fn from_words<I, S>(words: I, normalization: &Normalization) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut symbols = Vec::new();
        for word in words {
            symbols.extend(normalization.normalize(word.as_ref()));
        }
        Self { symbols }
    }

    pub fn from_symbols<I: IntoIterator<Item = Symbol>>(symbols: I) -> Self {
        Self {
            symbols: symbols.into_iter().filter(|c| !c.is_whitespace()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn get(&self, index: usize) -> Option<Symbol> {
        self.symbols.get(index).copied()
    }

    /// The same stream read back to front
    pub fn reversed(&self) -> Self {
        Self {
            symbols: self.symbols.iter().rev().copied().collect(),
        }
    }

    /// Every `stride`-th symbol starting at `offset`.
    ///
    /// A stride of zero is treated as one.
    pub fn restrict(&self, stride: usize, offset: usize) -> Vec<Symbol> {
        restrict(&self.symbols, stride, offset)
    }
}

pub(crate) fn restrict(symbols: &[Symbol], stride: usize, offset: usize) -> Vec<Symbol> {
    let stride = stride.max(1);
    match symbols.get(offset..) {
        Some(rest) => {
            let mut out = Vec::with_capacity(1 + rest.len() / stride);
            out.extend(rest.iter().step_by(stride).copied());
            out
        }
        None => Vec::new(),
    }
}

impl fmt::Display for LetterStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.symbols.iter().try_for_each(|c| write!(f, "{}", c))
    }
}

impl FromIterator<Symbol> for LetterStream {
    fn from_iter<T: IntoIterator<Item = Symbol>>(iter: T) -> Self {
        Self::from_symbols(iter)
    }
}
