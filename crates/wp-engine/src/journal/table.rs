//! Content-tracking journal.

use super::{now_timestamp, parse_timestamp, text_column, Journal, JournalTable};
use crate::error::{EngineError, EngineResult};
use crate::prepared::PreparedScript;
use sha2::{Digest, Sha256};
use std::rc::Rc;
use uuid::Uuid;
use wp_core::{AppliedIndex, AppliedRecord, NameComparison, RunPolicy};
use wp_db::{Connection, StoreDialect, Value};

/// Maximum characters stored in one content row
pub const CONTENT_CHUNK_CHARS: usize = 50_000;

/// Journal recording run policy, applier and content of every application.
///
/// Layout, for a table named `schemaversions`:
///
/// - `schemaversions`: one row per application
/// - `schemaversions_content`: one row per distinct content, keyed by hash
/// - `schemaversions_content_data`: content split into ordered chunks
/// - `schemaversions_x_content`: links applications to their content
pub struct TableJournal {
    table: JournalTable,
    applied_by: Option<String>,
    chunk_chars: usize,
}

impl TableJournal {
    pub fn new(dialect: Rc<dyn StoreDialect>, schema: Option<String>, table: &str) -> Self {
        Self {
            table: JournalTable::new(dialect, schema, table),
            applied_by: None,
            chunk_chars: CONTENT_CHUNK_CHARS,
        }
    }

    /// Record `applied_by` on every new row
    pub fn with_applied_by(mut self, applied_by: Option<String>) -> Self {
        self.applied_by = applied_by;
        self
    }

    /// Override the chunk size (at least one character)
    pub fn with_chunk_chars(mut self, chunk_chars: usize) -> Self {
        self.chunk_chars = chunk_chars.max(1);
        self
    }

    fn create_statements(&self) -> Vec<String> {
        let main = self.table.qualified("");
        let content = self.table.qualified("_content");
        let data = self.table.qualified("_content_data");
        let link = self.table.qualified("_x_content");
        vec![
            format!(
                "CREATE TABLE IF NOT EXISTS {main} (\
                 script_id UUID PRIMARY KEY, \
                 script_name VARCHAR(255) NOT NULL, \
                 script_type VARCHAR(50) NOT NULL, \
                 applied_date TIMESTAMP NOT NULL, \
                 applied_by VARCHAR(255))"
            ),
            format!(
                "CREATE TABLE IF NOT EXISTS {content} (\
                 script_content_id UUID PRIMARY KEY, \
                 content_hash VARCHAR(64) NOT NULL)"
            ),
            format!(
                "CREATE TABLE IF NOT EXISTS {data} (\
                 script_content_data_id UUID PRIMARY KEY, \
                 script_content_id UUID NOT NULL, \
                 content VARCHAR NOT NULL, \
                 sort_order INTEGER NOT NULL)"
            ),
            format!(
                "CREATE TABLE IF NOT EXISTS {link} (\
                 script_content_id UUID NOT NULL, \
                 script_id UUID NOT NULL, \
                 PRIMARY KEY (script_content_id, script_id))"
            ),
        ]
    }

    fn find_content(&self, conn: &dyn Connection, hash: &str) -> EngineResult<Option<String>> {
        let sql = format!(
            "SELECT CAST(script_content_id AS VARCHAR) FROM {} WHERE content_hash = ?",
            self.table.qualified("_content")
        );
        let found = conn
            .query_scalar(&sql, &[Value::from(hash)])
            .map_err(|e| EngineError::journal("looking up script content", e))?;
        Ok(found.and_then(|v| v.as_text().map(str::to_string)))
    }

    fn insert_content(
        &self,
        conn: &dyn Connection,
        hash: &str,
        contents: &str,
    ) -> EngineResult<String> {
        let content_id = Uuid::new_v4().to_string();
        conn.execute(
            &format!(
                "INSERT INTO {} (script_content_id, content_hash) VALUES (CAST(? AS UUID), ?)",
                self.table.qualified("_content")
            ),
            &[Value::from(content_id.as_str()), Value::from(hash)],
        )
        .map_err(|e| EngineError::journal("storing script content", e))?;

        let insert_chunk = format!(
            "INSERT INTO {} (script_content_data_id, script_content_id, content, sort_order) \
             VALUES (CAST(? AS UUID), CAST(? AS UUID), ?, ?)",
            self.table.qualified("_content_data")
        );
        for (position, chunk) in chunk_contents(contents, self.chunk_chars)
            .into_iter()
            .enumerate()
        {
            conn.execute(
                &insert_chunk,
                &[
                    Value::Text(Uuid::new_v4().to_string()),
                    Value::from(content_id.as_str()),
                    Value::Text(chunk),
                    Value::Integer(position as i64 + 1),
                ],
            )
            .map_err(|e| EngineError::journal("storing script content chunk", e))?;
        }
        Ok(content_id)
    }

    /// Records with their contents reassembled from chunks, oldest first.
    ///
    /// With `latest_only` only the most recent row of each script name is
    /// read.
    fn read_records(
        &self,
        conn: &dyn Connection,
        latest_only: bool,
    ) -> EngineResult<Vec<AppliedRecord>> {
        if !self.table.exists(conn)? {
            log::info!("Journal table does not exist");
            return Ok(Vec::new());
        }

        let main = self.table.qualified("");
        let (source, filter) = if latest_only {
            (
                format!(
                    "(SELECT *, row_number() OVER \
                     (PARTITION BY script_name ORDER BY applied_date DESC) AS recency FROM {main})"
                ),
                "WHERE m.recency = 1",
            )
        } else {
            (main, "")
        };
        let sql = format!(
            "SELECT CAST(m.script_id AS VARCHAR), m.script_name, m.script_type, \
             CAST(m.applied_date AS VARCHAR), m.applied_by, \
             CAST(x.script_content_id AS VARCHAR), d.content \
             FROM {source} m \
             LEFT JOIN {} x ON x.script_id = m.script_id \
             LEFT JOIN {} d ON d.script_content_id = x.script_content_id \
             {filter} \
             ORDER BY m.applied_date, m.script_name, m.script_id, d.sort_order",
            self.table.qualified("_x_content"),
            self.table.qualified("_content_data")
        );
        let rows = conn
            .query_rows(&sql, &[])
            .map_err(|e| EngineError::journal("reading executed scripts", e))?;

        // one row per chunk; rows of the same application are adjacent
        let mut records: Vec<AppliedRecord> = Vec::new();
        let mut current_id: Option<String> = None;
        for row in rows {
            let script_id = text_column(&row, 0);
            let chunk = text_column(&row, 6);
            if script_id.is_some() && script_id == current_id {
                if let Some(contents) = records.last_mut().and_then(|r| r.contents.as_mut()) {
                    contents.push_str(chunk.as_deref().unwrap_or_default());
                }
                continue;
            }

            let name = text_column(&row, 1).unwrap_or_default();
            let run_policy = RunPolicy::from_tag(&text_column(&row, 2).unwrap_or_default())?;
            let applied_at = parse_timestamp(row.get(3).unwrap_or(&Value::Null))?;
            let applied_by = text_column(&row, 4);
            let contents = text_column(&row, 5).map(|_| chunk.unwrap_or_default());

            records.push(
                AppliedRecord::new(name, run_policy, contents, applied_at)
                    .with_applied_by(applied_by),
            );
            current_id = script_id;
        }
        Ok(records)
    }
}

impl Journal for TableJournal {
    fn ensure_ready(&self, conn: &dyn Connection) -> EngineResult<()> {
        self.table.ensure(conn, &self.create_statements())
    }

    fn read_history(&self, conn: &dyn Connection) -> EngineResult<Vec<AppliedRecord>> {
        self.read_records(conn, false)
    }

    fn read_applied(
        &self,
        conn: &dyn Connection,
        comparison: NameComparison,
    ) -> EngineResult<AppliedIndex> {
        Ok(AppliedIndex::build(self.read_records(conn, true)?, comparison))
    }

    fn write_applied(&self, conn: &dyn Connection, script: &PreparedScript) -> EngineResult<()> {
        self.ensure_ready(conn)?;

        let contents = script.contents()?;
        let script_id = Uuid::new_v4().to_string();
        conn.execute(
            &format!(
                "INSERT INTO {} (script_id, script_name, script_type, applied_date, applied_by) \
                 VALUES (CAST(? AS UUID), ?, ?, CAST(? AS TIMESTAMP), ?)",
                self.table.qualified("")
            ),
            &[
                Value::from(script_id.as_str()),
                Value::from(script.name()),
                Value::from(script.options().run_policy.as_tag()),
                Value::Text(now_timestamp()),
                Value::from(self.applied_by.clone()),
            ],
        )
        .map_err(|e| EngineError::journal(&format!("recording {}", script.name()), e))?;

        let hash = content_hash(contents);
        let content_id = match self.find_content(conn, &hash)? {
            Some(existing) => existing,
            None => self.insert_content(conn, &hash, contents)?,
        };

        conn.execute(
            &format!(
                "INSERT INTO {} (script_content_id, script_id) VALUES (CAST(? AS UUID), CAST(? AS UUID))",
                self.table.qualified("_x_content")
            ),
            &[Value::from(content_id), Value::from(script_id)],
        )
        .map_err(|e| EngineError::journal("linking script content", e))?;

        log::debug!("Journaled {} in {}", script.name(), self.table.name());
        Ok(())
    }

    fn reset(&self) {
        self.table.reset();
    }
}

/// SHA-256 of `contents`, hex encoded
fn content_hash(contents: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(contents.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Split `contents` into chunks of at most `chunk_chars` characters.
///
/// Chunks break between characters, never inside a character's encoding.
/// Empty contents produce no chunks.
fn chunk_contents(contents: &str, chunk_chars: usize) -> Vec<String> {
    let chars: Vec<char> = contents.chars().collect();
    chars
        .chunks(chunk_chars.max(1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}

#[cfg(test)]
#[path = "table_test.rs"]
mod tests;
