//! Name-only journal.

use super::{now_timestamp, parse_timestamp, text_column, Journal, JournalTable};
use crate::error::{EngineError, EngineResult};
use crate::prepared::PreparedScript;
use std::rc::Rc;
use uuid::Uuid;
use wp_core::{AppliedRecord, RunPolicy};
use wp_db::{Connection, StoreDialect, Value};

/// Journal that records only script names and when they were applied.
///
/// Every record reads back as RunOnce without a content snapshot, so
/// RunIfChanged scripts always look changed.
pub struct SimpleTableJournal {
    table: JournalTable,
}

impl SimpleTableJournal {
    pub fn new(dialect: Rc<dyn StoreDialect>, schema: Option<String>, table: &str) -> Self {
        Self {
            table: JournalTable::new(dialect, schema, table),
        }
    }
}

impl Journal for SimpleTableJournal {
    fn ensure_ready(&self, conn: &dyn Connection) -> EngineResult<()> {
        let create = format!(
            "CREATE TABLE IF NOT EXISTS {} (\
             schemaversionsid UUID PRIMARY KEY, \
             scriptname VARCHAR(255) NOT NULL, \
             applied TIMESTAMP NOT NULL)",
            self.table.qualified("")
        );
        self.table.ensure(conn, &[create])
    }

    fn read_history(&self, conn: &dyn Connection) -> EngineResult<Vec<AppliedRecord>> {
        if !self.table.exists(conn)? {
            log::info!("Journal table does not exist");
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT scriptname, CAST(applied AS VARCHAR) FROM {} ORDER BY applied, scriptname",
            self.table.qualified("")
        );
        let rows = conn
            .query_rows(&sql, &[])
            .map_err(|e| EngineError::journal("reading executed scripts", e))?;

        rows.iter()
            .map(|row| {
                Ok(AppliedRecord::new(
                    text_column(row, 0).unwrap_or_default(),
                    RunPolicy::RunOnce,
                    None,
                    parse_timestamp(row.get(1).unwrap_or(&Value::Null))?,
                ))
            })
            .collect()
    }

    fn write_applied(&self, conn: &dyn Connection, script: &PreparedScript) -> EngineResult<()> {
        self.ensure_ready(conn)?;
        conn.execute(
            &format!(
                "INSERT INTO {} (schemaversionsid, scriptname, applied) \
                 VALUES (CAST(? AS UUID), ?, CAST(? AS TIMESTAMP))",
                self.table.qualified("")
            ),
            &[
                Value::Text(Uuid::new_v4().to_string()),
                Value::from(script.name()),
                Value::Text(now_timestamp()),
            ],
        )
        .map_err(|e| EngineError::journal(&format!("recording {}", script.name()), e))?;
        Ok(())
    }

    fn reset(&self) {
        self.table.reset();
    }
}
