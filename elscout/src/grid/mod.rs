//! Positional grids built from a letter stream.
//!
//! A stream is laid out row-major at a fixed width (the stride) after skipping
//! a number of leading symbols (the offset). Straight lines through the grid
//! are equidistant letter sequences of the stream.
pub mod index;
pub mod position;

pub use index::{GridIndex, Layout};
pub use position::{Delta, Position};
