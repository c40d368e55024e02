pub mod config;
pub mod errors;
pub mod grid;
pub mod metrics;
pub mod results;
pub mod search;
pub mod source;
pub mod stream;

pub use config::{ConfigOverrides, ScanConfig};
pub use errors::{SearchError, SearchResult};
pub use grid::{Delta, GridIndex, Layout, Position};
pub use results::{BookSweep, Direction, Match, MatchKind, SweepResult};
pub use search::{scan, GridMatcher, StrideSweeper, SweepOptions};
pub use stream::{LetterStream, Normalization, Symbol};
