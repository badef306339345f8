//! Error types for eikon.

use thiserror::Error;

/// Errors that can occur during index construction or queries.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RetrievalError {
    /// Malformed input: empty vector, non-positive `k`, bad constructor
    /// parameter.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Two vectors of different lengths were compared.
    #[error("dimension mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },

    /// Query issued against a tree or LSH index that has not been built.
    #[error("index has not been built")]
    IndexNotReady,
}

/// Result type alias for eikon operations.
pub type Result<T> = std::result::Result<T, RetrievalError>;
