//! wp-engine - Upgrade engine for Waypoint
//!
//! Turns discovered scripts into an ordered plan (journal read, filter,
//! sort), executes the plan script by script under a transaction strategy
//! and records each applied script in a journal.

pub mod duckdb;
pub mod engine;
pub mod error;
pub mod executor;
pub mod filter;
pub mod journal;
pub mod prepared;
pub mod result;
pub mod sorter;
pub mod transaction;

#[cfg(test)]
pub(crate) mod test_utils;

pub use duckdb::upgrader;
pub use engine::UpgradeEngine;
pub use error::{EngineError, EngineResult};
pub use executor::ScriptExecutor;
pub use filter::{DefaultScriptFilter, ScriptFilter};
pub use journal::{Journal, SimpleTableJournal, TableJournal, CONTENT_CHUNK_CHARS};
pub use prepared::{PreparedScript, Preprocessing, ScriptPreprocessor, SCHEMA_VARIABLE};
pub use result::{ExecutedScript, UpgradeResult};
pub use sorter::{DefaultScriptSorter, ScriptSorter};
pub use transaction::TransactionScope;
