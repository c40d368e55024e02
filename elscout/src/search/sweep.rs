use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::ops::Range;
use std::sync::Arc;
use tracing::{debug, info, trace};

use crate::errors::{SearchError, SearchResult};
use crate::metrics::SearchMetrics;
use crate::results::{BookSweep, Direction, SweepResult};
use crate::source::VerseText;
use crate::stream::{restrict, LetterStream, Normalization, Symbol};

/// Settings for a brute-force sweep over (stride, offset) pairs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepOptions {
    /// First stride to try; stride 1 is the stream itself
    pub start_stride: usize,
    /// First offset to try within every stride
    pub start_offset: usize,
    /// Largest stride to try, if lower than the natural bound
    pub max_stride: Option<usize>,
    /// Number of stride tasks allowed in flight at once
    pub max_concurrency: NonZeroUsize,
    /// Symbols of context kept on either side of the first occurrence
    pub context_width: usize,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            start_stride: 2,
            start_offset: 0,
            max_stride: None,
            max_concurrency: NonZeroUsize::new(num_cpus::get()).unwrap_or(NonZeroUsize::MIN),
            context_width: 8,
        }
    }
}

/// Scans every stride and offset of a stream for an equidistant occurrence of
/// a literal query, on a worker pool of bounded size.
#[derive(Debug, Clone)]
pub struct StrideSweeper {
    options: SweepOptions,
    metrics: Arc<SearchMetrics>,
}

impl StrideSweeper {
    pub fn new(options: SweepOptions) -> Self {
        Self::with_metrics(options, Arc::new(SearchMetrics::new()))
    }

    pub fn with_metrics(options: SweepOptions, metrics: Arc<SearchMetrics>) -> Self {
        Self { options, metrics }
    }

    pub fn options(&self) -> &SweepOptions {
        &self.options
    }

    pub fn metrics(&self) -> &SearchMetrics {
        &self.metrics
    }

    /// Strides worth trying for a query of `query_len` symbols in a stream of
    /// `stream_len` symbols
    pub fn stride_range(&self, stream_len: usize, query_len: usize) -> Range<usize> {
        if query_len == 0 {
            return 0..0;
        }
        let mut upper = stream_len / query_len;
        if let Some(max_stride) = self.options.max_stride {
            upper = upper.min(max_stride.saturating_add(1));
        }
        let start = self.options.start_stride.max(1);
        start..upper.max(start)
    }

    /// Returns one result per (stride, offset, direction) whose restriction
    /// contains `query`, sorted by stride, offset and direction.
    pub fn scan(&self, stream: &LetterStream, query: &str) -> SearchResult<Vec<SweepResult>> {
        let query: Vec<Symbol> = query.chars().filter(|c| !c.is_whitespace()).collect();
        if query.is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        let strides = self.stride_range(stream.len(), query.len());
        if strides.is_empty() {
            debug!(
                "No strides to scan for {} symbols in {} symbols",
                query.len(),
                stream.len()
            );
            return Ok(Vec::new());
        }

        info!(
            "Sweeping strides {}..{} over {} symbols with {} workers",
            strides.start,
            strides.end,
            stream.len(),
            self.options.max_concurrency
        );

        let forward = stream.symbols();
        let reversed = stream.reversed();
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.options.max_concurrency.get())
            .thread_name(|i| format!("elscout-sweep-{}", i))
            .build()?;

        let mut results: Vec<SweepResult> = pool.install(|| {
            strides
                .into_par_iter()
                .flat_map_iter(|stride| {
                    let mut hits = self.scan_stride(forward, &query, stride, Direction::Forward);
                    hits.extend(self.scan_stride(
                        reversed.symbols(),
                        &query,
                        stride,
                        Direction::Reversed,
                    ));
                    hits
                })
                .collect()
        });

        results.sort_by_key(|r| (r.stride, r.offset, r.direction));
        info!("Sweep complete. Found {} hits", results.len());
        Ok(results)
    }

    /// Sweeps each book of `text` in turn, then the whole text. The whole-text
    /// pass starts at the stride where the shortest book ran out, since every
    /// smaller stride has already been tried within each book.
    pub fn scan_books(
        &self,
        text: &VerseText,
        query: &str,
        normalization: &Normalization,
    ) -> SearchResult<Vec<BookSweep>> {
        let query_len = query.chars().filter(|c| !c.is_whitespace()).count();
        if query_len == 0 {
            return Err(SearchError::EmptyQuery);
        }

        let books = text.books();
        let mut sweeps = Vec::with_capacity(books.len() + 1);
        let mut fewest: Option<usize> = None;
        for (i, book) in books.iter().enumerate() {
            info!("Searching book {:?} ({} of {})", book, i + 1, books.len());
            let stream = text.book_stream(book, normalization)?;
            fewest = Some(fewest.map_or(stream.len(), |n| n.min(stream.len())));
            sweeps.push(BookSweep {
                book: Some(book.to_string()),
                symbols: stream.len(),
                start_stride: self.options.start_stride,
                results: self.scan(&stream, query)?,
            });
        }

        let stream = text.full_stream(normalization);
        let start_stride = (fewest.unwrap_or(0) / query_len).max(self.options.start_stride);
        info!(
            "Searching all {} books from stride {}",
            books.len(),
            start_stride
        );
        let whole = StrideSweeper::with_metrics(
            SweepOptions {
                start_stride,
                ..self.options.clone()
            },
            Arc::clone(&self.metrics),
        );
        sweeps.push(BookSweep {
            book: None,
            symbols: stream.len(),
            start_stride,
            results: whole.scan(&stream, query)?,
        });
        Ok(sweeps)
    }

    fn scan_stride(
        &self,
        symbols: &[Symbol],
        query: &[Symbol],
        stride: usize,
        direction: Direction,
    ) -> Vec<SweepResult> {
        trace!("Scanning stride {} ({:?})", stride, direction);

        let mut hits = Vec::new();
        for offset in self.options.start_offset..stride {
            let restricted = restrict(symbols, stride, offset);
            let (count, first) = count_occurrences(&restricted, query);
            self.metrics.record_restriction(count > 0);

            let Some(first) = first else {
                continue;
            };
            let scanned_index = offset + first * stride;
            let start_index = match direction {
                Direction::Forward => scanned_index,
                Direction::Reversed => symbols.len() - 1 - scanned_index,
            };
            let width = self.options.context_width;
            let from = first.saturating_sub(width);
            let to = first
                .saturating_add(query.len())
                .saturating_add(width)
                .min(restricted.len());

            hits.push(SweepResult {
                stride,
                offset,
                direction,
                count,
                start_index,
                context: restricted[from..to].iter().collect(),
            });
        }
        hits
    }
}

/// Sweeps `stream` for `query` from `start_stride` upwards with at most
/// `max_concurrency` strides in flight
pub fn scan(
    stream: &LetterStream,
    query: &str,
    start_stride: usize,
    max_concurrency: NonZeroUsize,
) -> SearchResult<Vec<SweepResult>> {
    StrideSweeper::new(SweepOptions {
        start_stride,
        max_concurrency,
        ..SweepOptions::default()
    })
    .scan(stream, query)
}

/// Counts non-overlapping occurrences of `needle`, returning the index of the
/// first one
fn count_occurrences(haystack: &[Symbol], needle: &[Symbol]) -> (usize, Option<usize>) {
    let mut count = 0;
    let mut first = None;
    let mut i = 0;
    while i + needle.len() <= haystack.len() {
        if haystack[i..i + needle.len()] == *needle {
            count += 1;
            first.get_or_insert(i);
            i += needle.len();
        } else {
            i += 1;
        }
    }
    (count, first)
}
