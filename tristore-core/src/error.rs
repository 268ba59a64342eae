//! Error types for tristore-core

use thiserror::Error;

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type
///
/// None of these are retried internally; callers own retry policy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The codec has no resolver for a datatype or marker byte
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// Range bounds disagree on datatype, or cannot be ordered
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// `plan` called on a pattern the strategy does not handle
    #[error("Unsupported pattern for layout {layout}: {reason}")]
    UnsupportedPattern {
        layout: &'static str,
        reason: String,
    },

    /// No registered layout can serve the pattern
    #[error("No applicable layout for pattern: {0}")]
    NoApplicableLayout(String),

    /// Caller supplied an argument outside the operation's contract
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Lexical form cannot be encoded (unparseable, or contains the row delimiter)
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Stored bytes do not decode
    #[error("Decode error: {0}")]
    Decode(String),

    /// Failure reported by the storage collaborator
    #[error("Storage error: {0}")]
    Storage(String),
}

impl Error {
    /// Create an unsupported type error
    pub fn unsupported_type(msg: impl Into<String>) -> Self {
        Error::UnsupportedType(msg.into())
    }

    /// Create an invalid range error
    pub fn invalid_range(msg: impl Into<String>) -> Self {
        Error::InvalidRange(msg.into())
    }

    /// Create an unsupported pattern error
    pub fn unsupported_pattern(layout: &'static str, reason: impl Into<String>) -> Self {
        Error::UnsupportedPattern {
            layout,
            reason: reason.into(),
        }
    }

    /// Create a no applicable layout error
    pub fn no_applicable_layout(msg: impl Into<String>) -> Self {
        Error::NoApplicableLayout(msg.into())
    }

    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    /// Create an invalid value error
    pub fn invalid_value(msg: impl Into<String>) -> Self {
        Error::InvalidValue(msg.into())
    }

    /// Create a decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        Error::Decode(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Error::Storage(msg.into())
    }

    /// Whether this error came from the storage collaborator
    pub fn is_storage(&self) -> bool {
        matches!(self, Error::Storage(_))
    }
}
