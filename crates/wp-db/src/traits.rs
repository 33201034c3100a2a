//! Store driver interface
//!
//! The engine needs very little from a store: run a statement, run a batch
//! of statements, read rows back, and control a transaction. Everything the
//! engine does against a store goes through [`Connection`].

use crate::error::DbResult;
use std::fmt;

/// A parameter or column value exchanged with the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Null,
    Integer(i64),
    Text(String),
}

impl Value {
    /// Text content, if the value is text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Integer content; numeric text is parsed
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            Value::Text(s) => s.trim().parse().ok(),
            Value::Null => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// A live connection to a store
///
/// Parameters are positional (`?`). Implementations are used from a single
/// thread.
pub trait Connection {
    /// Execute one statement, returning the number of affected rows
    fn execute(&self, sql: &str, params: &[Value]) -> DbResult<usize>;

    /// Execute text that may hold several statements, without parameters
    fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// Run a query and collect every row
    fn query_rows(&self, sql: &str, params: &[Value]) -> DbResult<Vec<Vec<Value>>>;

    /// First column of the first row, if any row came back
    fn query_scalar(&self, sql: &str, params: &[Value]) -> DbResult<Option<Value>> {
        let rows = self.query_rows(sql, params)?;
        Ok(rows.into_iter().next().and_then(|row| row.into_iter().next()))
    }

    fn begin(&self) -> DbResult<()>;

    fn commit(&self) -> DbResult<()>;

    fn rollback(&self) -> DbResult<()>;

    /// Store type identifier for logging
    fn db_type(&self) -> &'static str;
}

/// Opens connections to one configured store
pub trait ConnectionFactory {
    fn open(&self) -> DbResult<Box<dyn Connection>>;

    /// Store type identifier for logging
    fn db_type(&self) -> &'static str;
}
