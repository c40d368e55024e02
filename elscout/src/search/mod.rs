//! Equidistant letter sequence searches.
//!
//! Two drivers solve the same problem at different granularity:
//!
//! 1. [`GridMatcher`] works on one [`GridIndex`](crate::grid::GridIndex)
//!    (a single stride and offset) and finds every straight line through it
//!    that spells the query, in any of the eight directions and at any step
//!    size. It avoids brute force by only trying the displacements between
//!    the two adjacent query symbols that occur least often in the grid.
//!
//! 2. [`StrideSweeper`] tries every stride in a range and every offset within
//!    each stride, checking whether the query appears as a plain substring of
//!    that restriction of the stream (read forwards and backwards).
//!
//! Both fan their work out over rayon and join before returning; neither ever
//! hands back a partial result.
pub mod matcher;
pub mod sweep;

pub use matcher::{GridMatcher, MIN_QUERY_LEN};
pub use sweep::{scan, StrideSweeper, SweepOptions};
