//! Result types returned by grid matching and stride sweeps.
//!
//! Both are plain values: a [`Match`] is fully described by its positions, a
//! [`SweepResult`] by the (stride, offset, direction) it was found at.
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::grid::{Delta, Position};

/// How a match was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// A constant-delta walk through the grid
    Grid,
    /// The query spelled contiguously in the placed stream
    Literal,
    /// The query spelled backwards, contiguously, in the placed stream
    ReversedLiteral,
}

/// One occurrence of a query: a position per query symbol, in query order
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Match {
    pub kind: MatchKind,
    /// Step between consecutive positions; [`Delta::ZERO`] for literal matches
    pub delta: Delta,
    pub positions: Vec<Position>,
}

impl Match {
    pub fn grid(delta: Delta, positions: Vec<Position>) -> Self {
        Self {
            kind: MatchKind::Grid,
            delta,
            positions,
        }
    }

    pub fn literal(positions: Vec<Position>, reversed: bool) -> Self {
        Self {
            kind: if reversed {
                MatchKind::ReversedLiteral
            } else {
                MatchKind::Literal
            },
            delta: Delta::ZERO,
            positions,
        }
    }

    /// The cells covered, regardless of reading order
    pub fn position_set(&self) -> BTreeSet<Position> {
        self.positions.iter().copied().collect()
    }

    /// Checks the adjacency rule for this kind of match in a grid `cols` wide
    pub fn is_well_formed(&self, cols: usize) -> bool {
        match self.kind {
            MatchKind::Grid => {
                !self.delta.is_zero()
                    && self
                        .positions
                        .windows(2)
                        .all(|pair| pair[1] - pair[0] == self.delta)
            }
            MatchKind::Literal | MatchKind::ReversedLiteral => {
                let step: i64 = if self.kind == MatchKind::Literal { 1 } else { -1 };
                let linear: Option<Vec<usize>> =
                    self.positions.iter().map(|p| p.to_linear(cols)).collect();
                linear.is_some_and(|indexes| {
                    indexes
                        .windows(2)
                        .all(|pair| pair[1] as i64 - pair[0] as i64 == step)
                })
            }
        }
    }
}

/// Whether a sweep read the stream front to back or back to front
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Forward,
    Reversed,
}

/// A (stride, offset, direction) at which the sweep found the query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepResult {
    pub stride: usize,
    pub offset: usize,
    pub direction: Direction,
    /// Non-overlapping occurrences in the restricted subsequence
    pub count: usize,
    /// Index in the original stream of the first occurrence's first symbol
    pub start_index: usize,
    /// The restricted subsequence around the first occurrence
    pub context: String,
}

/// Sweep results for one book, or for the whole text when `book` is `None`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookSweep {
    pub book: Option<String>,
    /// Length of the swept stream
    pub symbols: usize,
    pub start_stride: usize,
    pub results: Vec<SweepResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_match_well_formed() {
        let m = Match::grid(
            Delta::new(0, 1),
            vec![Position::new(21, 7), Position::new(21, 8), Position::new(21, 9)],
        );
        assert!(m.is_well_formed(22));

        let bent = Match::grid(
            Delta::new(0, 1),
            vec![Position::new(21, 7), Position::new(21, 8), Position::new(20, 9)],
        );
        assert!(!bent.is_well_formed(22));
    }

    #[test]
    fn test_literal_match_wraps_rows() {
        let m = Match::literal(
            vec![Position::new(20, 21), Position::new(21, 21), Position::new(0, 22)],
            false,
        );
        assert!(m.is_well_formed(22));
        assert_eq!(m.delta, Delta::ZERO);

        let backwards = Match::literal(
            vec![Position::new(0, 22), Position::new(21, 21), Position::new(20, 21)],
            true,
        );
        assert!(backwards.is_well_formed(22));
        assert_eq!(backwards.position_set(), m.position_set());
        assert!(!Match::literal(backwards.positions.clone(), false).is_well_formed(22));
    }

    #[test]
    fn test_match_serializes_kind() {
        let m = Match::literal(vec![Position::new(0, 0)], true);
        let json = serde_json::to_string(&m).unwrap();
        assert!(json.contains("\"reversed_literal\""));
        let back: Match = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn test_direction_ordering() {
        assert!(Direction::Forward < Direction::Reversed);
    }
}
