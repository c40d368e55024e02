//! Text sources that turn scripture references into letter streams.
//!
//! The search engine only ever sees a [`LetterStream`]; this module is the
//! collaborator that finds which words a reference range covers.
mod books;
mod verses;

pub use books::{canonical_book, BOOKS};
pub use verses::{Verse, VerseText};

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

use crate::errors::{SearchError, SearchResult};
use crate::stream::{LetterStream, Normalization};

static REFERENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(.+?)\s*(\d+):(\d+)\s*$").expect("valid reference regex"));

/// A book, chapter and verse, e.g. `Numbers 4:11` or `Num4:11`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Reference {
    pub book: &'static str,
    pub chapter: u32,
    pub verse: u32,
}

impl FromStr for Reference {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = REFERENCE_RE
            .captures(s)
            .ok_or_else(|| SearchError::invalid_reference(s))?;
        let book = canonical_book(&caps[1])
            .ok_or_else(|| SearchError::invalid_reference(format!("unknown book in {:?}", s)))?;
        let chapter = caps[2]
            .parse()
            .map_err(|_| SearchError::invalid_reference(s))?;
        let verse = caps[3]
            .parse()
            .map_err(|_| SearchError::invalid_reference(s))?;
        Ok(Self {
            book,
            chapter,
            verse,
        })
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}:{}", self.book, self.chapter, self.verse)
    }
}

/// One verse or a run of verses within a chapter, e.g. `Ge1:1` or `Ge1:1-3`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VerseRange {
    pub first: Reference,
    pub last_verse: u32,
}

impl VerseRange {
    /// References of every verse in the range, in order
    pub fn references(&self) -> impl Iterator<Item = Reference> + '_ {
        (self.first.verse..=self.last_verse).map(move |verse| Reference {
            verse,
            ..self.first
        })
    }
}

impl FromStr for VerseRange {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (head, tail) = match s.rsplit_once('-') {
            Some((head, tail)) if head.contains(':') => (head, Some(tail)),
            _ => (s, None),
        };
        let first: Reference = head.parse()?;
        let last_verse = match tail {
            Some(tail) => tail
                .trim()
                .parse()
                .map_err(|_| SearchError::invalid_reference(s))?,
            None => first.verse,
        };
        if last_verse < first.verse {
            return Err(SearchError::invalid_reference(format!(
                "{:?} ends before it starts",
                s
            )));
        }
        Ok(Self { first, last_verse })
    }
}

impl fmt::Display for VerseRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first)?;
        if self.last_verse != self.first.verse {
            write!(f, "-{}", self.last_verse)?;
        }
        Ok(())
    }
}

/// Something that can map a reference range onto a run of words
pub trait TextSource {
    /// First and last word index (0-based, inclusive) covered by the verses
    /// from `start` through `end`
    fn resolve_range(&self, start: &str, end: &str) -> SearchResult<(usize, usize)>;

    /// Words `first..=last`
    fn word_slice(&self, first: usize, last: usize) -> SearchResult<&[String]>;

    fn letter_stream(
        &self,
        start: &str,
        end: &str,
        normalization: &Normalization,
    ) -> SearchResult<LetterStream> {
        let (first, last) = self.resolve_range(start, end)?;
        let words = self.word_slice(first, last)?;
        Ok(LetterStream::from_words(words, normalization))
    }
}
