//! Error types for query execution

use thiserror::Error;

/// Query execution errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Error from tristore-core (planning, decoding, storage)
    #[error("Core error: {0}")]
    Core(#[from] tristore_core::Error),

    /// Bad join input (arity, unbound or range-valued keys)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Cursor used after `close()`
    #[error("Cursor is closed")]
    CursorClosed,
}

impl QueryError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

/// Result type for query operations
pub type Result<T> = std::result::Result<T, QueryError>;
