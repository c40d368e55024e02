use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

use super::position::Position;
use crate::errors::{SearchError, SearchResult};
use crate::stream::{LetterStream, Symbol};

/// Reading direction used when drawing a grid.
///
/// Only the display order of columns changes; stored positions never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    #[default]
    LeftToRight,
    RightToLeft,
}

/// A letter stream laid out in rows of `cols` symbols, together with a reverse
/// index from each symbol to every cell holding it.
///
/// Built once from (stream, stride, offset) and read-only afterwards, so it can
/// be shared freely between search tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridIndex {
    cols: usize,
    rows: usize,
    offset: usize,
    cells: Vec<Symbol>,
    lookup: HashMap<Symbol, Vec<Position>>,
}

impl GridIndex {
    /// Lays `stream` out `stride` columns wide, skipping its first `offset`
    /// symbols.
    pub fn build(stream: &LetterStream, stride: usize, offset: usize) -> SearchResult<Self> {
        if stride < 1 {
            return Err(SearchError::InvalidStride(stride));
        }

        let cells: Vec<Symbol> = stream.symbols().iter().skip(offset).copied().collect();
        let rows = cells.len().div_ceil(stride);

        let mut lookup: HashMap<Symbol, Vec<Position>> = HashMap::new();
        for (index, &symbol) in cells.iter().enumerate() {
            lookup
                .entry(symbol)
                .or_default()
                .push(Position::from_linear(index, stride));
        }

        debug!(
            "GridIndex::build({}, {}): {} stream symbols, {} grid symbols, {} rows, {} distinct",
            stride,
            offset,
            stream.len(),
            cells.len(),
            rows,
            lookup.len()
        );

        Ok(Self {
            cols: stride,
            rows,
            offset,
            cells,
            lookup,
        })
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of stream symbols skipped before the first cell
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of placed symbols
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Placed symbols in row-major order
    pub fn symbols(&self) -> &[Symbol] {
        &self.cells
    }

    pub fn get(&self, position: Position) -> Option<Symbol> {
        position
            .to_linear(self.cols)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Every cell holding `symbol`, in row-major order
    pub fn positions(&self, symbol: Symbol) -> &[Position] {
        self.lookup.get(&symbol).map_or(&[], Vec::as_slice)
    }

    pub fn distinct_symbols(&self) -> usize {
        self.lookup.len()
    }

    /// Rows as they should be drawn: for each display column, the storage
    /// position it shows and the symbol there (None past the end of the last
    /// row).
    pub fn display_rows(&self, layout: Layout) -> Vec<Vec<(Position, Option<Symbol>)>> {
        (0..self.rows)
            .map(|row| {
                (0..self.cols)
                    .map(|display_col| {
                        let col = match layout {
                            Layout::LeftToRight => display_col,
                            Layout::RightToLeft => self.cols - display_col - 1,
                        };
                        let position = Position::new(col as i64, row as i64);
                        (position, self.get(position))
                    })
                    .collect()
            })
            .collect()
    }

    /// Draws the grid, one row per line
    pub fn render(&self, layout: Layout) -> String {
        self.display_rows(layout)
            .iter()
            .map(|row| {
                row.iter()
                    .map(|(_, symbol)| symbol.unwrap_or(' '))
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for GridIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(Layout::LeftToRight))
    }
}
