//! Store dialects
//!
//! A dialect carries the few things that differ between stores: how to
//! quote names and which quotes the scanner honours, how to make sure a
//! schema exists and whether a table is there, and how to describe a driver
//! failure to a human.

use crate::error::DbError;
use wp_sql::{BatchDelimiter, QuoteRules};

/// Store-specific SQL and diagnostics
pub trait StoreDialect {
    /// Dialect name for logging
    fn name(&self) -> &'static str;

    /// Schema used when none is configured
    fn default_schema(&self) -> &'static str;

    /// Quote a single identifier
    fn quote_identifier(&self, ident: &str) -> String {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }

    /// Quote a table name, qualified by `schema` when given
    fn qualify(&self, schema: Option<&str>, table: &str) -> String {
        match schema {
            Some(schema) => format!(
                "{}.{}",
                self.quote_identifier(schema),
                self.quote_identifier(table)
            ),
            None => self.quote_identifier(table),
        }
    }

    /// Statement that creates `schema` when missing, if the store has schemas
    fn verify_schema_sql(&self, schema: &str) -> Option<String>;

    /// Query counting tables named by the parameters `(schema, table)`
    fn table_exists_sql(&self) -> &'static str;

    /// Batch delimiter scripts for this store use by default
    fn batch_delimiter(&self) -> BatchDelimiter {
        BatchDelimiter::default()
    }

    /// Quoting conventions used when splitting batches and substituting
    /// variables
    fn quote_rules(&self) -> QuoteRules {
        QuoteRules::default()
    }

    /// Human readable description of a driver failure
    fn describe_failure(&self, err: &DbError) -> String;
}

/// DuckDB dialect
#[derive(Debug, Clone, Copy, Default)]
pub struct DuckDbDialect;

impl StoreDialect for DuckDbDialect {
    fn name(&self) -> &'static str {
        "duckdb"
    }

    fn default_schema(&self) -> &'static str {
        "main"
    }

    fn verify_schema_sql(&self, schema: &str) -> Option<String> {
        Some(format!(
            "CREATE SCHEMA IF NOT EXISTS {}",
            self.quote_identifier(schema)
        ))
    }

    fn table_exists_sql(&self) -> &'static str {
        "SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = ? AND table_name = ?"
    }

    // brackets are list literals and subscripts
    fn quote_rules(&self) -> QuoteRules {
        QuoteRules {
            bracket_identifiers: false,
        }
    }

    fn describe_failure(&self, err: &DbError) -> String {
        // DuckDB messages look like "Parser Error: syntax error at ..."
        let detail = err.detail();
        match detail.split_once(": ") {
            Some((kind, rest)) if kind.ends_with(" Error") => {
                let kind = kind.trim_end_matches(" Error");
                format!("DuckDB {} error: {rest}", kind.to_lowercase())
            }
            _ => format!("DuckDB error: {detail}"),
        }
    }
}
