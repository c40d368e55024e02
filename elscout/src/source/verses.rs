use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;
use std::path::Path;
use tracing::debug;

use super::{canonical_book, Reference, TextSource, VerseRange};
use crate::errors::{SearchError, SearchResult};
use crate::stream::{LetterStream, Normalization};

static VERSE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.*?)(\d+):(\d+)$").expect("valid verse regex"));

const WORD_TRIM: &[char] = &['.', ',', ':', ';', '!', '?', '(', ')'];

/// One verse: where it sits and which words of the text it owns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verse {
    pub book: &'static str,
    pub chapter: u32,
    pub verse: u32,
    pub words: Range<usize>,
    /// The verse as written, without its heading
    pub text: String,
}

impl Verse {
    pub fn reference(&self) -> Reference {
        Reference {
            book: self.book,
            chapter: self.chapter,
            verse: self.verse,
        }
    }

    fn is(&self, reference: &Reference) -> bool {
        self.book == reference.book
            && self.chapter == reference.chapter
            && self.verse == reference.verse
    }
}

/// A whole text, one verse per line, e.g.
///
/// ```text
/// Ge1:1 In the beginning God created the heaven and the earth.
/// ```
///
/// Words are numbered consecutively across the whole text.
#[derive(Debug, Clone, Default)]
pub struct VerseText {
    verses: Vec<Verse>,
    words: Vec<String>,
}

impl VerseText {
    /// Reads and parses a verse file
    pub fn load(path: &Path) -> SearchResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => SearchError::file_not_found(path),
            _ => SearchError::IoError(e),
        })?;
        let text = Self::parse(&contents)?;
        debug!(
            "Loaded {} verses, {} words from {}",
            text.verses.len(),
            text.words.len(),
            path.display()
        );
        Ok(text)
    }

    /// Parses verse lines. A first line that is not a verse is taken to be a
    /// header and skipped.
    pub fn parse(contents: &str) -> SearchResult<Self> {
        let mut text = Self::default();

        for (index, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let mut tokens = line.split_whitespace();
            let heading = tokens.next().unwrap_or_default();
            let Some((book, chapter, verse)) = parse_heading(heading) else {
                if index == 0 {
                    debug!("Skipping header line: {:?}", line);
                    continue;
                }
                return Err(SearchError::parse_error(
                    index + 1,
                    format!("unable to parse verse: {:?}", heading),
                ));
            };

            let body = line[heading.len()..].trim().to_string();
            let start = text.words.len();
            text.words.extend(
                tokens
                    .map(|word| word.trim_matches(WORD_TRIM))
                    .filter(|word| !word.is_empty())
                    .map(str::to_string),
            );
            text.verses.push(Verse {
                book,
                chapter,
                verse,
                words: start..text.words.len(),
                text: body,
            });
        }

        Ok(text)
    }

    pub fn verses(&self) -> &[Verse] {
        &self.verses
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    pub fn verse_words(&self, verse: &Verse) -> &[String] {
        &self.words[verse.words.clone()]
    }

    /// The verses of `range` present in the text. Verses past the end of the
    /// chapter are left out; a range with none at all is an error.
    pub fn lookup(&self, range: &VerseRange) -> SearchResult<Vec<&Verse>> {
        let found: Vec<&Verse> = range
            .references()
            .filter_map(|reference| self.verses.iter().find(|v| v.is(&reference)))
            .collect();
        if found.is_empty() {
            return Err(SearchError::reference_not_found(range.to_string()));
        }
        Ok(found)
    }

    /// Book names in the order they first appear
    pub fn books(&self) -> Vec<&'static str> {
        let mut books: Vec<&'static str> = Vec::new();
        for verse in &self.verses {
            if !books.contains(&verse.book) {
                books.push(verse.book);
            }
        }
        books
    }

    /// First and last word of a whole book
    pub fn book_range(&self, book: &str) -> SearchResult<(usize, usize)> {
        let name = canonical_book(book).ok_or_else(|| SearchError::invalid_reference(book))?;
        let first = self.verses.iter().position(|v| v.book == name);
        let last = self.verses.iter().rposition(|v| v.book == name);
        match (first, last) {
            (Some(first), Some(last)) => self.span(first, last, book),
            _ => Err(SearchError::reference_not_found(name)),
        }
    }

    pub fn book_stream(&self, book: &str, normalization: &Normalization) -> SearchResult<LetterStream> {
        let (first, last) = self.book_range(book)?;
        Ok(LetterStream::from_words(self.word_slice(first, last)?, normalization))
    }

    pub fn full_stream(&self, normalization: &Normalization) -> LetterStream {
        LetterStream::from_words(&self.words, normalization)
    }

    // Word span from the start of verse `first` to the end of verse `last`.
    fn span(&self, first: usize, last: usize, label: &str) -> SearchResult<(usize, usize)> {
        let start = self.verses[first].words.start;
        let end = self.verses[last].words.end;
        if last < first || end <= start {
            return Err(SearchError::invalid_reference(format!(
                "{} covers no words",
                label
            )));
        }
        Ok((start, end - 1))
    }
}

impl TextSource for VerseText {
    fn resolve_range(&self, start: &str, end: &str) -> SearchResult<(usize, usize)> {
        let from: Reference = start.parse()?;
        let to: Reference = end.parse()?;

        let first = self
            .verses
            .iter()
            .position(|v| v.is(&from))
            .ok_or_else(|| SearchError::reference_not_found(from.to_string()))?;
        let last = self
            .verses
            .iter()
            .rposition(|v| v.is(&to))
            .ok_or_else(|| SearchError::reference_not_found(to.to_string()))?;

        self.span(first, last, &format!("{} - {}", from, to))
    }

    fn word_slice(&self, first: usize, last: usize) -> SearchResult<&[String]> {
        if last < first {
            return Err(SearchError::invalid_reference(format!(
                "word range {}..={} is empty",
                first, last
            )));
        }
        self.words.get(first..=last).ok_or_else(|| {
            SearchError::invalid_reference(format!(
                "word range {}..={} is past the end ({} words)",
                first,
                last,
                self.words.len()
            ))
        })
    }
}

fn parse_heading(heading: &str) -> Option<(&'static str, u32, u32)> {
    let caps = VERSE_RE.captures(heading)?;
    let book = canonical_book(&caps[1])?;
    let chapter = caps[2].parse().ok()?;
    let verse = caps[3].parse().ok()?;
    Some((book, chapter, verse))
}
