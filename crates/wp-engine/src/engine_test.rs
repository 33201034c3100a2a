use super::*;
use crate::journal::TableJournal;
use crate::test_utils::{Call, RecordingConnection, RecordingFactory, UnreachableFactory};
use std::cell::RefCell;
use wp_core::{RunPolicy, ScriptOptions, StaticScriptProvider};
use wp_db::{DuckDbConnectionFactory, DuckDbDialect, StoreDialect, Value};
use wp_sql::SqlError;

fn dialect() -> Rc<dyn StoreDialect> {
    Rc::new(DuckDbDialect)
}

fn duckdb_engine(provider: StaticScriptProvider) -> UpgradeEngine {
    UpgradeEngine::new(
        DuckDbConnectionFactory::in_memory(),
        TableJournal::new(dialect(), None, "schemaversions"),
        ScriptExecutor::new(dialect()),
    )
    .with_provider(provider)
}

fn count(engine: &UpgradeEngine, sql: &str) -> i64 {
    engine
        .open_connection()
        .unwrap()
        .query_scalar(sql, &[])
        .unwrap()
        .and_then(|v| v.as_integer())
        .unwrap()
}

#[test]
fn test_unresolved_placeholder_fails_before_execution() {
    let conn = Rc::new(RecordingConnection::new());
    let engine = UpgradeEngine::new(
        RecordingFactory::new(Rc::clone(&conn)),
        TableJournal::new(dialect(), None, "schemaversions"),
        ScriptExecutor::new(dialect()),
    )
    .with_provider(
        StaticScriptProvider::new()
            .with_script("001.sql", "SELECT 1")
            .with_script("002.sql", "SELECT $__var__$missing$__var__$"),
    );

    let result = engine.perform_upgrade();

    assert!(!result.successful());
    assert!(result.scripts().is_empty());
    assert_eq!(result.error_script().unwrap().name, "002.sql");
    assert!(matches!(
        result.error(),
        Some(EngineError::Sql(SqlError::UnresolvedVariable { name })) if name == "missing"
    ));
    // only the journal existence check reached the store
    assert!(conn
        .calls()
        .iter()
        .all(|call| matches!(call, Call::Query(_))));
}

#[test]
fn test_missing_providers_is_configuration_error() {
    let engine = UpgradeEngine::new(
        DuckDbConnectionFactory::in_memory(),
        TableJournal::new(dialect(), None, "schemaversions"),
        ScriptExecutor::new(dialect()),
    );
    let result = engine.perform_upgrade();
    assert!(matches!(
        result.error(),
        Some(EngineError::Configuration { .. })
    ));
    assert!(engine.scripts_to_execute().is_err());
}

#[test]
fn test_unreachable_store() {
    let engine = UpgradeEngine::new(
        UnreachableFactory,
        TableJournal::new(dialect(), None, "schemaversions"),
        ScriptExecutor::new(dialect()),
    )
    .with_provider(StaticScriptProvider::new().with_script("001.sql", "SELECT 1"));

    let result = engine.perform_upgrade();
    assert!(!result.successful());
    assert!(result.error_script().is_none());

    let message = engine.try_connect().unwrap_err();
    assert!(message.contains("store unreachable"));
}

#[test]
fn test_try_connect_succeeds() {
    let engine = duckdb_engine(StaticScriptProvider::new());
    assert_eq!(engine.try_connect(), Ok(()));
}

#[test]
fn test_observers_see_each_script_in_order() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let engine = duckdb_engine(
        StaticScriptProvider::new()
            .with_script("002.sql", "CREATE TABLE b (id INT)")
            .with_script("001.sql", "CREATE TABLE a (id INT)"),
    )
    .on_script_executed(move |script| sink.borrow_mut().push(script.name().to_string()));

    assert!(engine.perform_upgrade().successful());
    assert_eq!(*seen.borrow(), vec!["001.sql", "002.sql"]);
}

#[test]
fn test_schema_is_verified_before_scripts() {
    let engine = UpgradeEngine::new(
        DuckDbConnectionFactory::in_memory(),
        TableJournal::new(dialect(), Some("app".to_string()), "schemaversions"),
        ScriptExecutor::new(dialect()).with_schema(Some("app".to_string())),
    )
    .with_preprocessing(Preprocessing::new().with_schema_variable("\"app\""))
    .with_provider(StaticScriptProvider::new().with_script(
        "001.sql",
        "CREATE TABLE $__var__$schema$__var__$.users (id INT)",
    ));

    let result = engine.perform_upgrade();
    assert!(result.successful(), "{:?}", result.error());
    assert_eq!(count(&engine, "SELECT COUNT(*) FROM app.users"), 0);
    assert_eq!(count(&engine, "SELECT COUNT(*) FROM app.schemaversions"), 1);
}

#[test]
fn test_per_run_failure_rolls_back_everything() {
    let engine = duckdb_engine(
        StaticScriptProvider::new()
            .with_script("001.sql", "CREATE TABLE a (id INT)")
            .with_script("002.sql", "SELEC broken"),
    )
    .with_transaction_mode(TransactionMode::PerRun);

    let result = engine.perform_upgrade();
    assert!(!result.successful());
    assert_eq!(result.error_script().unwrap().name, "002.sql");

    assert!(engine.history().unwrap().is_empty());
    assert_eq!(
        count(
            &engine,
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_name = 'a'"
        ),
        0
    );

    // the journal table went with the rollback and is recreated on retry
    let result = engine.mark_as_executed(Some("001.sql"));
    assert!(result.successful(), "{:?}", result.error());
    assert_eq!(engine.history().unwrap().len(), 1);
}

#[test]
fn test_per_run_failure_reports_no_executed_scripts() {
    let engine = duckdb_engine(
        StaticScriptProvider::new()
            .with_script("S1.sql", "CREATE TABLE s1 (id INT)")
            .with_script("S2.sql", "SELEC broken"),
    )
    .with_transaction_mode(TransactionMode::PerRun);

    let result = engine.perform_upgrade();
    assert!(!result.successful());
    assert!(result.scripts().is_empty());
    assert_eq!(result.error_script().unwrap().name, "S2.sql");
    assert!(engine.history().unwrap().is_empty());
}

#[test]
fn test_per_script_failure_keeps_completed_scripts() {
    let engine = duckdb_engine(
        StaticScriptProvider::new()
            .with_script("S1.sql", "CREATE TABLE s1 (id INT)")
            .with_script("S2.sql", "SELEC broken"),
    )
    .with_transaction_mode(TransactionMode::PerScript);

    let result = engine.perform_upgrade();
    assert!(!result.successful());
    assert_eq!(result.scripts().len(), 1);
    assert_eq!(result.scripts()[0].name, "S1.sql");
    assert_eq!(engine.history().unwrap().len(), 1);
}

#[test]
fn test_mark_as_executed_with_absent_target_marks_all_pending() {
    let engine = duckdb_engine(
        StaticScriptProvider::new()
            .with_script("001.sql", "SELECT 1")
            .with_script("002.sql", "SELECT 2"),
    );
    let result = engine.mark_as_executed(Some("999.sql"));
    assert!(result.successful(), "{:?}", result.error());

    let marked: Vec<&str> = result.scripts().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(marked, vec!["001.sql", "002.sql"]);
    assert_eq!(engine.history().unwrap().len(), 2);
}

#[test]
fn test_mark_as_executed_stops_at_target() {
    let engine = duckdb_engine(
        StaticScriptProvider::new()
            .with_script("001.sql", "SELECT 1")
            .with_script("002.sql", "SELECT 2"),
    );
    let result = engine.mark_as_executed(Some("001.sql"));
    assert!(result.successful(), "{:?}", result.error());
    assert_eq!(result.scripts().len(), 1);
    assert_eq!(engine.scripts_to_execute().unwrap()[0].name(), "002.sql");
}

#[test]
fn test_mark_as_executed_does_not_run_scripts() {
    let engine = duckdb_engine(
        StaticScriptProvider::new().with_script("001.sql", "CREATE TABLE never (id INT)"),
    );
    let result = engine.mark_as_executed(None);
    assert!(result.successful());
    assert_eq!(result.scripts()[0].name, "001.sql");
    assert_eq!(
        count(
            &engine,
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_name = 'never'"
        ),
        0
    );
    assert!(!engine.is_upgrade_required().unwrap());
}

#[test]
fn test_executed_but_not_discovered_uses_name_policy() {
    let engine = duckdb_engine(
        StaticScriptProvider::new()
            .with_script("001.sql", "SELECT 1")
            .with_script("OLD.sql", "SELECT 2"),
    );
    assert!(engine.perform_upgrade().successful());

    let conn = engine.open_connection().unwrap();
    conn.execute(
        "UPDATE schemaversions SET script_name = ? WHERE script_name = ?",
        &[Value::from("old.sql"), Value::from("OLD.sql")],
    )
    .unwrap();
    drop(conn);

    assert_eq!(engine.executed_but_not_discovered().unwrap(), vec!["old.sql"]);

    let ignore_case = engine.with_name_comparison(NameComparison::OrdinalIgnoreCase);
    assert!(ignore_case.executed_but_not_discovered().unwrap().is_empty());
}

#[test]
fn test_executed_scripts_are_latest_per_name() {
    let engine = duckdb_engine(StaticScriptProvider::new().with_script_options(
        "views.sql",
        "SELECT 1",
        ScriptOptions::new(RunPolicy::RunAlways, 0),
    ));
    assert!(engine.perform_upgrade().successful());
    assert!(engine.perform_upgrade().successful());

    assert_eq!(engine.history().unwrap().len(), 2);
    let executed = engine.executed_scripts().unwrap();
    assert_eq!(executed.len(), 1);
    assert_eq!(executed[0].name, "views.sql");
    assert_eq!(executed[0].run_policy, RunPolicy::RunAlways);
}
