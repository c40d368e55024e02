use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// A (column, row) cell of a grid, assigned in row-major order.
///
/// Coordinates are signed so that a walk can step off the grid; such positions
/// simply have no cell.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Position {
    pub col: i64,
    pub row: i64,
}

impl Position {
    pub const fn new(col: i64, row: i64) -> Self {
        Self { col, row }
    }

    /// The position of the `index`-th placed symbol in a grid `cols` wide
    pub fn from_linear(index: usize, cols: usize) -> Self {
        Self {
            col: (index % cols) as i64,
            row: (index / cols) as i64,
        }
    }

    /// Inverse of [`Position::from_linear`]; `None` outside the column range
    pub fn to_linear(self, cols: usize) -> Option<usize> {
        if self.col < 0 || self.row < 0 || self.col >= cols as i64 {
            return None;
        }
        Some(self.row as usize * cols + self.col as usize)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{},{}}}", self.col, self.row)
    }
}

/// Constant per-step displacement of a straight-line walk.
///
/// Not normalized: magnitude is the distance between consecutive symbols.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Delta {
    pub dcol: i64,
    pub drow: i64,
}

impl Delta {
    /// Sentinel carried by matches found in the linear stream
    pub const ZERO: Delta = Delta { dcol: 0, drow: 0 };

    pub const fn new(dcol: i64, drow: i64) -> Self {
        Self { dcol, drow }
    }

    pub fn is_zero(self) -> bool {
        self == Self::ZERO
    }
}

impl fmt::Display for Delta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.dcol, self.drow)
    }
}

impl Sub for Position {
    type Output = Delta;

    fn sub(self, rhs: Position) -> Delta {
        Delta {
            dcol: self.col - rhs.col,
            drow: self.row - rhs.row,
        }
    }
}

impl Add<Delta> for Position {
    type Output = Position;

    fn add(self, rhs: Delta) -> Position {
        Position {
            col: self.col + rhs.dcol,
            row: self.row + rhs.drow,
        }
    }
}
