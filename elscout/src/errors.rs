//! Error types shared by grid construction, grid matching, stride sweeping and
//! the verse text source.
//!
//! Every condition is returned to the immediate caller. The engine itself never
//! retries or logs these; deciding whether a failed query aborts a batch is left
//! to whoever drives the search (the CLI keeps going after `SymbolNotFound`).
use std::path::PathBuf;
use thiserror::Error;

/// Result type for search operations
pub type SearchResult<T> = Result<T, SearchError>;

/// Errors that can occur while building or searching a letter grid
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Invalid stride: {0} (must be at least 1)")]
    InvalidStride(usize),
    #[error("{query:?} has {len} symbols, need at least {min}")]
    TooShortQuery {
        query: String,
        len: usize,
        min: usize,
    },
    #[error("{query:?} not found - missing {symbol:?}")]
    SymbolNotFound { query: String, symbol: char },
    #[error("Query contains no symbols")]
    EmptyQuery,
    #[error("Invalid reference: {0}")]
    InvalidReference(String),
    #[error("Reference not found: {0}")]
    ReferenceNotFound(String),
    #[error("Parse error on line {line}: {message}")]
    ParseError { line: usize, message: String },
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl SearchError {
    pub fn too_short_query(query: impl Into<String>, len: usize, min: usize) -> Self {
        Self::TooShortQuery {
            query: query.into(),
            len,
            min,
        }
    }

    pub fn symbol_not_found(query: impl Into<String>, symbol: char) -> Self {
        Self::SymbolNotFound {
            query: query.into(),
            symbol,
        }
    }

    pub fn invalid_reference(reference: impl Into<String>) -> Self {
        Self::InvalidReference(reference.into())
    }

    pub fn reference_not_found(reference: impl Into<String>) -> Self {
        Self::ReferenceNotFound(reference.into())
    }

    pub fn parse_error(line: usize, message: impl Into<String>) -> Self {
        Self::ParseError {
            line,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound(path.into())
    }

    /// Whether the error only concerns a single query, so a batch of
    /// independent queries may carry on past it.
    pub fn is_query_error(&self) -> bool {
        matches!(
            self,
            Self::TooShortQuery { .. } | Self::SymbolNotFound { .. } | Self::EmptyQuery
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = SearchError::too_short_query("ab", 2, 3);
        assert!(matches!(err, SearchError::TooShortQuery { len: 2, .. }));

        let err = SearchError::symbol_not_found("abc", 'z');
        assert!(matches!(err, SearchError::SymbolNotFound { symbol: 'z', .. }));

        let err = SearchError::invalid_reference("Numbers");
        assert!(matches!(err, SearchError::InvalidReference(_)));

        let err = SearchError::reference_not_found("Numbers 99:1");
        assert!(matches!(err, SearchError::ReferenceNotFound(_)));

        let err = SearchError::parse_error(3, "bad verse");
        assert!(matches!(err, SearchError::ParseError { line: 3, .. }));
    }

    #[test]
    fn test_error_messages() {
        let err = SearchError::InvalidStride(0);
        assert_eq!(err.to_string(), "Invalid stride: 0 (must be at least 1)");

        let err = SearchError::too_short_query("ab", 2, 3);
        assert_eq!(err.to_string(), "\"ab\" has 2 symbols, need at least 3");

        let err = SearchError::symbol_not_found("abc", 'z');
        assert_eq!(err.to_string(), "\"abc\" not found - missing 'z'");

        let err = SearchError::config_error("Missing required field");
        assert_eq!(
            err.to_string(),
            "Configuration error: Missing required field"
        );

        let err = SearchError::file_not_found("kjv.txt");
        assert_eq!(err.to_string(), "File not found: kjv.txt");
    }

    #[test]
    fn test_query_errors_do_not_abort_batches() {
        assert!(SearchError::symbol_not_found("abc", 'z').is_query_error());
        assert!(SearchError::too_short_query("ab", 2, 3).is_query_error());
        assert!(SearchError::EmptyQuery.is_query_error());
        assert!(!SearchError::InvalidStride(0).is_query_error());
        assert!(!SearchError::config_error("x").is_query_error());
    }
}
