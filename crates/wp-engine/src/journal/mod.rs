//! Durable records of applied scripts.
//!
//! Two journals are provided: [`TableJournal`] keeps the run policy and a
//! content snapshot of every application (content is deduplicated and
//! stored in ordered chunks), [`SimpleTableJournal`] keeps names and
//! timestamps only.
//!
//! Journals write through the connection they are handed, so a record
//! belongs to whatever transaction the caller has open.

mod simple;
mod table;

pub use simple::SimpleTableJournal;
pub use table::{TableJournal, CONTENT_CHUNK_CHARS};

use crate::error::{EngineError, EngineResult};
use crate::prepared::PreparedScript;
use chrono::{NaiveDateTime, Utc};
use std::cell::Cell;
use std::rc::Rc;
use wp_core::{AppliedIndex, AppliedRecord, NameComparison};
use wp_db::{Connection, StoreDialect, Value};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Store of applied-script records
pub trait Journal {
    /// Create the backing tables if they do not exist yet
    fn ensure_ready(&self, conn: &dyn Connection) -> EngineResult<()>;

    /// Every record, oldest first. Empty when the journal does not exist.
    fn read_history(&self, conn: &dyn Connection) -> EngineResult<Vec<AppliedRecord>>;

    /// Latest record per script name
    fn read_applied(
        &self,
        conn: &dyn Connection,
        comparison: NameComparison,
    ) -> EngineResult<AppliedIndex> {
        Ok(AppliedIndex::build(self.read_history(conn)?, comparison))
    }

    /// Append a record for `script`
    fn write_applied(&self, conn: &dyn Connection, script: &PreparedScript) -> EngineResult<()>;

    /// Forget what is known about the backing tables
    fn reset(&self);
}

/// Location of a journal table and whether it is known to exist
pub(crate) struct JournalTable {
    dialect: Rc<dyn StoreDialect>,
    schema: Option<String>,
    table: String,
    known_to_exist: Cell<bool>,
}

impl JournalTable {
    pub(crate) fn new(
        dialect: Rc<dyn StoreDialect>,
        schema: Option<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            dialect,
            schema,
            table: table.into(),
            known_to_exist: Cell::new(false),
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.table
    }

    /// Quoted, schema-qualified name of the table with `suffix` appended
    pub(crate) fn qualified(&self, suffix: &str) -> String {
        self.dialect
            .qualify(self.schema.as_deref(), &format!("{}{suffix}", self.table))
    }

    pub(crate) fn exists(&self, conn: &dyn Connection) -> EngineResult<bool> {
        if self.known_to_exist.get() {
            return Ok(true);
        }
        log::debug!("Checking whether journal table exists..");
        let schema = self
            .schema
            .as_deref()
            .unwrap_or(self.dialect.default_schema());
        let count = conn
            .query_scalar(
                self.dialect.table_exists_sql(),
                &[Value::from(schema), Value::from(self.table.as_str())],
            )
            .map_err(|e| EngineError::journal("probing journal table", e))?;
        let exists = count.and_then(|v| v.as_integer()).unwrap_or(0) > 0;
        self.known_to_exist.set(exists);
        Ok(exists)
    }

    /// Probe, then run `create` when the table is missing
    pub(crate) fn ensure(&self, conn: &dyn Connection, create: &[String]) -> EngineResult<()> {
        if self.exists(conn)? {
            return Ok(());
        }
        log::info!("Creating the {} table", self.qualified(""));
        if let Some(schema) = &self.schema {
            if let Some(sql) = self.dialect.verify_schema_sql(schema) {
                conn.execute_batch(&sql)
                    .map_err(|e| EngineError::journal("creating journal schema", e))?;
            }
        }
        for sql in create {
            conn.execute_batch(sql)
                .map_err(|e| EngineError::journal("creating journal table", e))?;
        }
        log::info!("The {} table has been created", self.qualified(""));
        self.known_to_exist.set(true);
        Ok(())
    }

    pub(crate) fn reset(&self) {
        self.known_to_exist.set(false);
    }
}

/// Current UTC time, rendered for a `CAST(? AS TIMESTAMP)` parameter
pub(crate) fn now_timestamp() -> String {
    Utc::now()
        .naive_utc()
        .format("%Y-%m-%d %H:%M:%S%.6f")
        .to_string()
}

pub(crate) fn parse_timestamp(value: &Value) -> EngineResult<NaiveDateTime> {
    let text = value.as_text().unwrap_or_default();
    NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT)
        .map_err(|e| EngineError::journal(&format!("reading timestamp '{text}'"), e))
}

pub(crate) fn text_column(row: &[Value], idx: usize) -> Option<String> {
    match row.get(idx) {
        Some(Value::Text(s)) => Some(s.clone()),
        Some(Value::Integer(n)) => Some(n.to_string()),
        _ => None,
    }
}
