//! DuckDB driver

use crate::error::{DbError, DbResult};
use crate::row_helpers::collect_rows;
use crate::traits::{Connection, ConnectionFactory, Value};
use duckdb::types::{ToSqlOutput, Value as DuckValue};
use duckdb::ToSql;
use std::path::Path;
use std::sync::Mutex;

impl ToSql for Value {
    fn to_sql(&self) -> duckdb::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(DuckValue::Null),
            Value::Integer(n) => ToSqlOutput::Owned(DuckValue::BigInt(*n)),
            Value::Text(s) => ToSqlOutput::Owned(DuckValue::Text(s.clone())),
        })
    }
}

/// A connection to a DuckDB database
pub struct DuckDbConnection {
    conn: duckdb::Connection,
}

impl DuckDbConnection {
    pub fn new(conn: duckdb::Connection) -> Self {
        Self { conn }
    }

    /// Open a standalone in-memory database
    pub fn in_memory() -> DbResult<Self> {
        let conn = duckdb::Connection::open_in_memory()
            .map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self { conn })
    }

    fn control(&self, sql: &str) -> DbResult<()> {
        self.conn
            .execute_batch(sql)
            .map_err(|e| DbError::TransactionError(format!("{sql} failed: {e}")))
    }
}

impl Connection for DuckDbConnection {
    fn execute(&self, sql: &str, params: &[Value]) -> DbResult<usize> {
        log::trace!("duckdb execute: {sql}");
        Ok(self
            .conn
            .execute(sql, duckdb::params_from_iter(params.iter()))?)
    }

    fn execute_batch(&self, sql: &str) -> DbResult<()> {
        log::trace!("duckdb execute_batch: {sql}");
        Ok(self.conn.execute_batch(sql)?)
    }

    fn query_rows(&self, sql: &str, params: &[Value]) -> DbResult<Vec<Vec<Value>>> {
        log::trace!("duckdb query: {sql}");
        let mut stmt = self.conn.prepare(sql)?;
        collect_rows(&mut stmt, params)
    }

    fn begin(&self) -> DbResult<()> {
        self.control("BEGIN TRANSACTION")
    }

    fn commit(&self) -> DbResult<()> {
        self.control("COMMIT")
    }

    fn rollback(&self) -> DbResult<()> {
        self.control("ROLLBACK")
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }
}

/// Opens connections to one DuckDB database.
///
/// The database is opened on first use and every connection handed out
/// afterwards shares it, so an in-memory database keeps its contents for
/// the lifetime of the factory.
pub struct DuckDbConnectionFactory {
    path: String,
    root: Mutex<Option<duckdb::Connection>>,
}

impl DuckDbConnectionFactory {
    /// Factory for a database file, or `:memory:`
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            root: Mutex::new(None),
        }
    }

    /// Factory for a private in-memory database
    pub fn in_memory() -> Self {
        Self::new(":memory:")
    }

    fn open_database(&self) -> DbResult<duckdb::Connection> {
        let opened = if self.path == ":memory:" {
            duckdb::Connection::open_in_memory()
        } else {
            duckdb::Connection::open(Path::new(&self.path))
        };
        opened.map_err(|e| DbError::ConnectionError(format!("{e}: {}", self.path)))
    }
}

impl ConnectionFactory for DuckDbConnectionFactory {
    fn open(&self) -> DbResult<Box<dyn Connection>> {
        let mut root = self
            .root
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))?;

        if root.is_none() {
            log::debug!("Opening DuckDB database at {}", self.path);
            *root = Some(self.open_database()?);
        }

        let conn = match root.as_ref() {
            Some(db) => db
                .try_clone()
                .map_err(|e| DbError::ConnectionError(e.to_string()))?,
            None => return Err(DbError::ConnectionError(self.path.clone())),
        };
        Ok(Box::new(DuckDbConnection::new(conn)))
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
