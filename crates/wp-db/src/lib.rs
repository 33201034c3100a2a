//! wp-db - Store driver layer for Waypoint
//!
//! This crate provides the `Connection` and `ConnectionFactory` traits the
//! engine talks to, the `StoreDialect` capability interface, and their
//! DuckDB implementations.

pub mod dialect;
pub mod duckdb;
pub mod error;
pub(crate) mod row_helpers;
pub mod traits;

pub use dialect::{DuckDbDialect, StoreDialect};
pub use duckdb::{DuckDbConnection, DuckDbConnectionFactory};
pub use error::{DbError, DbResult};
pub use traits::{Connection, ConnectionFactory, Value};
