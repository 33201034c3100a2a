//! Test doubles for the store driver.

use std::cell::RefCell;
use std::rc::Rc;
use wp_db::{Connection, ConnectionFactory, DbError, DbResult, Value};

/// One call made against a [`RecordingConnection`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Execute(String),
    Batch(String),
    Query(String),
    Begin,
    Commit,
    Rollback,
}

/// Connection that records every call and returns no rows.
///
/// Journal existence checks see no journal table, so reads come back empty.
#[derive(Default)]
pub struct RecordingConnection {
    calls: RefCell<Vec<Call>>,
    fail_batch_containing: Option<String>,
    fail_commit: bool,
}

impl RecordingConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail any batch whose text contains `needle`
    pub fn failing_on(mut self, needle: &str) -> Self {
        self.fail_batch_containing = Some(needle.to_string());
        self
    }

    pub fn failing_on_commit(mut self) -> Self {
        self.fail_commit = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// Text of every batch executed, in order
    pub fn batches(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                Call::Batch(sql) => Some(sql.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

impl Connection for RecordingConnection {
    fn execute(&self, sql: &str, _params: &[Value]) -> DbResult<usize> {
        self.record(Call::Execute(sql.to_string()));
        Ok(1)
    }

    fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.record(Call::Batch(sql.to_string()));
        match &self.fail_batch_containing {
            Some(needle) if sql.contains(needle.as_str()) => Err(DbError::ExecutionError(
                format!("Parser Error: cannot run {needle}"),
            )),
            _ => Ok(()),
        }
    }

    fn query_rows(&self, sql: &str, _params: &[Value]) -> DbResult<Vec<Vec<Value>>> {
        self.record(Call::Query(sql.to_string()));
        Ok(Vec::new())
    }

    fn begin(&self) -> DbResult<()> {
        self.record(Call::Begin);
        Ok(())
    }

    fn commit(&self) -> DbResult<()> {
        self.record(Call::Commit);
        if self.fail_commit {
            return Err(DbError::TransactionError("COMMIT failed".to_string()));
        }
        Ok(())
    }

    fn rollback(&self) -> DbResult<()> {
        self.record(Call::Rollback);
        Ok(())
    }

    fn db_type(&self) -> &'static str {
        "recording"
    }
}

/// Factory whose connections cannot be opened
pub struct UnreachableFactory;

impl ConnectionFactory for UnreachableFactory {
    fn open(&self) -> DbResult<Box<dyn Connection>> {
        Err(DbError::ConnectionError("store unreachable".to_string()))
    }

    fn db_type(&self) -> &'static str {
        "unreachable"
    }
}

/// Factory handing out one shared [`RecordingConnection`]
pub struct RecordingFactory {
    conn: Rc<RecordingConnection>,
}

impl RecordingFactory {
    pub fn new(conn: Rc<RecordingConnection>) -> Self {
        Self { conn }
    }
}

impl ConnectionFactory for RecordingFactory {
    fn open(&self) -> DbResult<Box<dyn Connection>> {
        Ok(Box::new(SharedConnection(Rc::clone(&self.conn))))
    }

    fn db_type(&self) -> &'static str {
        "recording"
    }
}

struct SharedConnection(Rc<RecordingConnection>);

impl Connection for SharedConnection {
    fn execute(&self, sql: &str, params: &[Value]) -> DbResult<usize> {
        self.0.execute(sql, params)
    }

    fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.0.execute_batch(sql)
    }

    fn query_rows(&self, sql: &str, params: &[Value]) -> DbResult<Vec<Vec<Value>>> {
        self.0.query_rows(sql, params)
    }

    fn begin(&self) -> DbResult<()> {
        self.0.begin()
    }

    fn commit(&self) -> DbResult<()> {
        self.0.commit()
    }

    fn rollback(&self) -> DbResult<()> {
        self.0.rollback()
    }

    fn db_type(&self) -> &'static str {
        self.0.db_type()
    }
}
