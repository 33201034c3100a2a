//! Running prepared scripts against a connection.

use crate::error::{EngineError, EngineResult};
use crate::prepared::PreparedScript;
use std::rc::Rc;
use wp_db::{Connection, StoreDialect};
use wp_sql::{split_batches, BatchDelimiter};

/// Splits scripts into batches and executes them in order
pub struct ScriptExecutor {
    dialect: Rc<dyn StoreDialect>,
    delimiter: BatchDelimiter,
    schema: Option<String>,
}

impl ScriptExecutor {
    /// Executor using the dialect's default batch delimiter
    pub fn new(dialect: Rc<dyn StoreDialect>) -> Self {
        let delimiter = dialect.batch_delimiter();
        Self {
            dialect,
            delimiter,
            schema: None,
        }
    }

    pub fn with_delimiter(mut self, delimiter: BatchDelimiter) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Schema to verify before the first script runs
    pub fn with_schema(mut self, schema: Option<String>) -> Self {
        self.schema = schema;
        self
    }

    /// Make sure the configured schema exists
    pub fn verify_schema(&self, conn: &dyn Connection) -> EngineResult<()> {
        let Some(schema) = &self.schema else {
            return Ok(());
        };
        if let Some(sql) = self.dialect.verify_schema_sql(schema) {
            log::debug!("Verifying schema {schema}");
            conn.execute_batch(&sql)?;
        }
        Ok(())
    }

    /// Execute every batch of `script`, stopping at the first failure.
    ///
    /// The contents are computed before anything is sent to the store, so
    /// an unresolved variable fails without touching the connection.
    pub fn execute(&self, conn: &dyn Connection, script: &PreparedScript) -> EngineResult<()> {
        let contents = script.contents()?;
        let batches = split_batches(contents, &self.delimiter, self.dialect.quote_rules());

        log::info!("Executing script '{}'", script.name());
        for (index, batch) in batches.iter().enumerate() {
            if let Err(source) = conn.execute_batch(batch) {
                log::error!(
                    "Script '{}' failed at batch {index}: {}",
                    script.name(),
                    self.dialect.describe_failure(&source)
                );
                log::debug!("Failed batch:\n{batch}");
                return Err(EngineError::ScriptExecution {
                    script: script.name().to_string(),
                    index,
                    source,
                });
            }
        }
        Ok(())
    }
}
