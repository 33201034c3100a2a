//! Error types for wp-sql

use thiserror::Error;

/// Script text processing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SqlError {
    /// Placeholder without a value (S001)
    #[error("[S001] Variable {name} has no value defined")]
    UnresolvedVariable { name: String },

    /// Unusable delimiter definition (S002)
    #[error("[S002] Invalid delimiter: {0}")]
    InvalidDelimiter(String),
}

/// Result type alias for SqlError
pub type SqlResult<T> = Result<T, SqlError>;
