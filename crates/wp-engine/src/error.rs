//! Error types for wp-engine

use thiserror::Error;
use wp_core::CoreError;
use wp_db::DbError;
use wp_sql::SqlError;

/// Upgrade engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Invalid setup detected before any work starts (U001)
    #[error("[U001] Invalid upgrade configuration: {message}")]
    Configuration { message: String },

    /// The store rejected a batch of a script (U002)
    #[error("[U002] Script '{script}' failed at batch {index}: {source}")]
    ScriptExecution {
        script: String,
        index: usize,
        #[source]
        source: DbError,
    },

    /// Journal lookup, creation, read or write failed (U003)
    #[error("[U003] Journal error: {message}")]
    Journal { message: String },

    /// Transaction control failed (U004)
    #[error("[U004] Transaction error: {message}")]
    Transaction { message: String },

    /// A preprocessor rejected a script (U005)
    #[error("[U005] Preprocessing failed: {message}")]
    Preprocessing { message: String },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Sql(#[from] SqlError),

    #[error(transparent)]
    Db(#[from] DbError),
}

/// Result type alias for EngineError
pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    pub(crate) fn journal(context: &str, err: impl std::fmt::Display) -> Self {
        EngineError::Journal {
            message: format!("{context}: {err}"),
        }
    }

    pub(crate) fn transaction(err: DbError) -> Self {
        EngineError::Transaction {
            message: err.to_string(),
        }
    }
}
