//! Wiring an [`UpgradeEngine`] for DuckDB from project configuration.

use crate::engine::UpgradeEngine;
use crate::error::{EngineError, EngineResult};
use crate::executor::ScriptExecutor;
use crate::journal::{SimpleTableJournal, TableJournal};
use crate::prepared::Preprocessing;
use std::path::Path;
use std::rc::Rc;
use wp_core::{Config, FileSystemScriptProvider, JournalKind};
use wp_db::{DuckDbConnectionFactory, DuckDbDialect, StoreDialect};
use wp_sql::BatchDelimiter;

/// Build an engine for the DuckDB database described by `config`.
///
/// Relative database and script paths are resolved against `project_dir`.
pub fn upgrader(config: &Config, project_dir: &Path) -> EngineResult<UpgradeEngine> {
    let dialect: Rc<dyn StoreDialect> = Rc::new(DuckDbDialect);

    let delimiter = BatchDelimiter::new(
        config.batch_delimiter.marker.as_str(),
        config.batch_delimiter.requires_whitespace,
    )
    .map_err(|e| EngineError::Configuration {
        message: e.to_string(),
    })?;

    let executor = ScriptExecutor::new(Rc::clone(&dialect))
        .with_delimiter(delimiter)
        .with_schema(config.schema.clone());

    let mut preprocessing = Preprocessing::new()
        .with_variables(config.variables.clone())
        .variables_enabled(config.variables_enabled)
        .with_quote_rules(dialect.quote_rules());
    if let Some(schema) = &config.schema {
        preprocessing = preprocessing.with_schema_variable(dialect.quote_identifier(schema));
    }

    let location = database_location(config, project_dir);
    log::debug!("Preparing {} upgrader for '{}'", dialect.name(), location);
    let connections = DuckDbConnectionFactory::new(location);
    let journal_schema = config.journal_schema().map(str::to_string);
    let table = config.journal.table.as_str();

    let mut engine = match config.journal.kind {
        JournalKind::Full => UpgradeEngine::new(
            connections,
            TableJournal::new(Rc::clone(&dialect), journal_schema, table)
                .with_applied_by(config.journal.applied_by.clone()),
            executor,
        ),
        JournalKind::Simple => UpgradeEngine::new(
            connections,
            SimpleTableJournal::new(Rc::clone(&dialect), journal_schema, table),
            executor,
        ),
    };

    for (path, location) in config.script_paths_absolute(project_dir) {
        engine = engine.with_provider(
            FileSystemScriptProvider::new(path)
                .recursive(location.recursive)
                .extension(location.extension.clone())
                .options(location.options()),
        );
    }

    Ok(engine
        .with_preprocessing(preprocessing)
        .with_transaction_mode(config.transaction)
        .with_name_comparison(config.name_comparison))
}

fn database_location(config: &Config, project_dir: &Path) -> String {
    let path = config.database.path.as_str();
    if path == ":memory:" || Path::new(path).is_absolute() {
        path.to_string()
    } else {
        project_dir.join(path).to_string_lossy().into_owned()
    }
}
