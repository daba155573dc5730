//! Error types for Brook live queries.

use crate::types::ColumnType;
use alloc::string::{String, ToString};
use core::fmt;

/// Result type alias for Brook operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors surfaced by cursors, registries and the stream operators.
///
/// Every error that reaches a subscriber is terminal for that subscription.
/// An absent query result is never an error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Registering a change listener failed.
    #[error("failed to register change observer for {uri}: {message}")]
    Registration { uri: String, message: String },
    /// A single-row operator saw a second row.
    #[error("cursor returned more than one row")]
    CardinalityViolation,
    /// Caller-supplied row mapping failed or panicked.
    #[error("mapper failed: {message}")]
    Mapper { message: String },
    /// Column lookup by name failed.
    #[error("column '{column}' does not exist")]
    ColumnNotFound { column: String },
    /// Column lookup by index failed.
    #[error("column index {index} out of range ({count} columns)")]
    ColumnOutOfRange { index: usize, count: usize },
    /// Cell holds a different storage class than requested.
    #[error("column {index} holds {got}, expected {expected}")]
    TypeMismatch {
        index: usize,
        expected: ColumnType,
        got: ColumnType,
    },
    /// Column access outside of a row.
    #[error("cursor is not positioned on a row")]
    NoCurrentRow,
    /// Access after `close()`.
    #[error("cursor is closed")]
    CursorClosed,
    /// Resource identifier could not be parsed.
    #[error("invalid uri '{uri}': {message}")]
    InvalidUri { uri: String, message: String },
    /// The worker context could not run a job.
    #[error("worker failure: {message}")]
    Worker { message: String },
}

impl Error {
    /// Creates a registration error.
    pub fn registration(uri: impl fmt::Display, message: impl Into<String>) -> Self {
        Error::Registration {
            uri: uri.to_string(),
            message: message.into(),
        }
    }

    /// Creates a mapper error from any displayable cause.
    pub fn mapper(cause: impl fmt::Display) -> Self {
        Error::Mapper {
            message: cause.to_string(),
        }
    }

    /// Creates a column not found error.
    pub fn column_not_found(column: impl Into<String>) -> Self {
        Error::ColumnNotFound {
            column: column.into(),
        }
    }

    /// Creates a type mismatch error.
    pub fn type_mismatch(index: usize, expected: ColumnType, got: ColumnType) -> Self {
        Error::TypeMismatch {
            index,
            expected,
            got,
        }
    }

    /// Creates an invalid uri error.
    pub fn invalid_uri(uri: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidUri {
            uri: uri.into(),
            message: message.into(),
        }
    }

    /// Creates a worker error.
    pub fn worker(message: impl Into<String>) -> Self {
        Error::Worker {
            message: message.into(),
        }
    }

    /// Returns true for the "more than one row" failure of single-row operators.
    ///
    /// This usually points at a query missing a uniqueness constraint or a limit.
    #[inline]
    pub fn is_cardinality_violation(&self) -> bool {
        matches!(self, Error::CardinalityViolation)
    }
}
