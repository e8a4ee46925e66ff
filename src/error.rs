//! Error types for the cache engine
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

use crate::cache::NumericKind;

// == Cache Error Enum ==
/// Unified error type for cache operations.
///
/// A failed operation never leaves a partial mutation behind.
#[derive(Error, Debug)]
pub enum CacheError {
    /// `add` found a live entry for the key
    #[error("Item already exists: {0}")]
    AlreadyExists(String),

    /// No live entry for the key (absent or expired)
    #[error("Item not found: {0}")]
    NotFound(String),

    /// Stored value is not of the kind the arithmetic operation requires
    #[error("Value for {key} is not {expected}")]
    TypeMismatch {
        key: String,
        expected: Expected,
    },

    /// Snapshot stream or file failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot encode or decode failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// == Expected Kind ==
/// What an arithmetic call was willing to accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    /// Any integer or float kind
    Numeric,
    /// `f32` or `f64`
    Float,
    /// Exactly this kind
    Kind(NumericKind),
}

impl std::fmt::Display for Expected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expected::Numeric => f.write_str("numeric"),
            Expected::Float => f.write_str("f32 or f64"),
            Expected::Kind(kind) => write!(f, "{}", kind),
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
