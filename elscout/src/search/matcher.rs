use rayon::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

use crate::errors::{SearchError, SearchResult};
use crate::grid::{Delta, GridIndex, Position};
use crate::metrics::SearchMetrics;
use crate::results::Match;
use crate::stream::Symbol;

/// Shortest query a straight-line search accepts. Two points always make a
/// line, so anything shorter matches nearly everywhere.
pub const MIN_QUERY_LEN: usize = 3;

/// Finds every straight-line and literal occurrence of a query in a grid
#[derive(Debug, Clone)]
pub struct GridMatcher<'a> {
    grid: &'a GridIndex,
    metrics: Arc<SearchMetrics>,
}

impl<'a> GridMatcher<'a> {
    pub fn new(grid: &'a GridIndex) -> Self {
        Self::with_metrics(grid, Arc::new(SearchMetrics::new()))
    }

    pub fn with_metrics(grid: &'a GridIndex, metrics: Arc<SearchMetrics>) -> Self {
        Self { grid, metrics }
    }

    pub fn metrics(&self) -> &SearchMetrics {
        &self.metrics
    }

    /// Returns all matches of `query` (whitespace ignored), in no particular
    /// order. Matches covering the same set of cells are reported once, grid
    /// matches taking precedence over literal ones.
    pub fn find(&self, query: &str) -> SearchResult<Vec<Match>> {
        let symbols = strip_whitespace(query);
        if symbols.len() < MIN_QUERY_LEN {
            return Err(SearchError::too_short_query(
                query,
                symbols.len(),
                MIN_QUERY_LEN,
            ));
        }

        let deltas = self.fewest_delta_pairs(&symbols)?;
        debug!("{:?}: got {} deltas", query, deltas.len());

        let grid_matches: Vec<Match> = deltas
            .par_iter()
            .flat_map_iter(|&delta| self.matches_with_delta(&symbols, delta))
            .collect();
        let literal_matches = self.literal_matches(&symbols);

        let mut seen = HashSet::new();
        let matches: Vec<Match> = grid_matches
            .into_iter()
            .chain(literal_matches)
            .filter(|m| seen.insert(m.position_set()))
            .collect();

        debug!("{:?}: found {} matches", query, matches.len());
        Ok(matches)
    }

    /// Picks the adjacent query pair whose position sets have the smallest
    /// product and returns every delta between their cells.
    ///
    /// Ties go to the earliest pair.
    pub(crate) fn fewest_delta_pairs(&self, symbols: &[Symbol]) -> SearchResult<HashSet<Delta>> {
        let mut cheapest: Option<(usize, &[Position], &[Position])> = None;
        let mut last: &[Position] = &[];

        for (i, &symbol) in symbols.iter().enumerate() {
            let positions = self.grid.positions(symbol);
            if positions.is_empty() {
                let query: String = symbols.iter().collect();
                return Err(SearchError::symbol_not_found(query, symbol));
            }

            if i > 0 {
                let cost = last.len() * positions.len();
                if cheapest.map_or(true, |(lowest, _, _)| cost < lowest) {
                    cheapest = Some((cost, last, positions));
                }
            }
            last = positions;
        }

        // No grid has more distinct steps than fit inside it, so a dense pair
        // is cheaper to replace with every step the grid allows. Verification
        // rejects the extra ones.
        let (cols, rows) = (self.grid.cols(), self.grid.rows());
        let limit = delta_space_len(cols, rows);
        let deltas = match cheapest {
            Some((cost, _, _)) if cost > limit => {
                debug!("Pair cost {} exceeds {} possible steps", cost, limit);
                delta_space(cols, rows).collect()
            }
            Some((_, first, second)) => pair_deltas(first, second, limit),
            None => HashSet::new(),
        };
        self.metrics.record_deltas(deltas.len() as u64);
        Ok(deltas)
    }

    /// Walks `delta` from every cell holding the first query symbol
    fn matches_with_delta(&self, symbols: &[Symbol], delta: Delta) -> Vec<Match> {
        let starts = self.grid.positions(symbols[0]);
        let matches: Vec<Match> = starts
            .iter()
            .filter_map(|&start| self.walk(symbols, start, delta))
            .map(|positions| Match::grid(delta, positions))
            .collect();
        self.metrics
            .record_walks(starts.len() as u64, matches.len() as u64);
        matches
    }

    fn walk(&self, symbols: &[Symbol], start: Position, delta: Delta) -> Option<Vec<Position>> {
        let mut positions = Vec::with_capacity(symbols.len());
        let mut position = start;
        for (i, &symbol) in symbols.iter().enumerate() {
            if i > 0 {
                position = position + delta;
            }
            if self.grid.get(position) != Some(symbol) {
                return None;
            }
            positions.push(position);
        }
        Some(positions)
    }

    /// Contiguous occurrences of the query, forwards or backwards, in the
    /// placed symbols. Positions are listed in query order.
    fn literal_matches(&self, symbols: &[Symbol]) -> Vec<Match> {
        let cols = self.grid.cols();
        let len = symbols.len();
        let reversed: Vec<Symbol> = symbols.iter().rev().copied().collect();

        let mut matches = Vec::new();
        for (start, window) in self.grid.symbols().windows(len).enumerate() {
            if window == symbols {
                let positions = (start..start + len)
                    .map(|k| Position::from_linear(k, cols))
                    .collect();
                matches.push(Match::literal(positions, false));
            }
            if window == reversed.as_slice() {
                let positions = (start..start + len)
                    .rev()
                    .map(|k| Position::from_linear(k, cols))
                    .collect();
                matches.push(Match::literal(positions, true));
            }
        }
        self.metrics.record_literal_matches(matches.len() as u64);
        matches
    }
}

impl GridIndex {
    /// Finds every occurrence of `query` in this grid. See [`GridMatcher::find`].
    pub fn find(&self, query: &str) -> SearchResult<Vec<Match>> {
        GridMatcher::new(self).find(query)
    }
}

fn strip_whitespace(query: &str) -> Vec<Symbol> {
    query.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Every non-zero displacement from a cell in `first` to a cell in `second`.
/// `limit` bounds how many distinct deltas can exist.
pub(crate) fn pair_deltas(first: &[Position], second: &[Position], limit: usize) -> HashSet<Delta> {
    let product = first.len().saturating_mul(second.len());
    let mut deltas = HashSet::with_capacity(product.min(limit));
    for &a in first {
        for &b in second {
            let delta = b - a;
            if !delta.is_zero() {
                deltas.insert(delta);
            }
        }
    }
    deltas
}

/// Number of non-zero steps between two cells of a `cols` x `rows` grid
pub(crate) fn delta_space_len(cols: usize, rows: usize) -> usize {
    if cols == 0 || rows == 0 {
        return 0;
    }
    (2 * cols - 1)
        .saturating_mul(2 * rows - 1)
        .saturating_sub(1)
}

fn delta_space(cols: usize, rows: usize) -> impl Iterator<Item = Delta> {
    let dcols = 1 - cols as i64..cols as i64;
    let drows = 1 - rows as i64..rows as i64;
    dcols
        .flat_map(move |dcol| drows.clone().map(move |drow| Delta::new(dcol, drow)))
        .filter(|delta| !delta.is_zero())
}
