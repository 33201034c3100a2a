use super::*;

fn global() -> GlobalArgs {
    GlobalArgs {
        verbose: false,
        project_dir: ".".to_string(),
        config: None,
        database: None,
        vars: Vec::new(),
    }
}

fn config() -> Config {
    Config::parse(
        r#"
database:
  path: app.duckdb
variables:
  env: dev
  region: eu
scripts:
  - path: migrations
"#,
    )
    .unwrap()
}

#[test]
fn test_command_line_vars_override_config() {
    let mut config = config();
    let mut global = global();
    global.vars = vec![
        ("env".to_string(), "prod".to_string()),
        ("extra".to_string(), "1".to_string()),
    ];

    apply_overrides(&mut config, &global, None);

    assert_eq!(config.variables["env"], "prod");
    assert_eq!(config.variables["region"], "eu");
    assert_eq!(config.variables["extra"], "1");
}

#[test]
fn test_database_override() {
    let mut config = config();
    let mut global = global();
    global.database = Some(":memory:".to_string());

    apply_overrides(&mut config, &global, None);
    assert_eq!(config.database.path, ":memory:");
}

#[test]
fn test_applied_by_defaults_only_when_unset() {
    let mut config = config();
    apply_overrides(&mut config, &global(), Some("alice".to_string()));
    assert_eq!(config.journal.applied_by.as_deref(), Some("alice"));

    let mut config = self::config();
    config.journal.applied_by = Some("deploy-bot".to_string());
    apply_overrides(&mut config, &global(), Some("alice".to_string()));
    assert_eq!(config.journal.applied_by.as_deref(), Some("deploy-bot"));
}

#[test]
fn test_load_config_from_project_dir() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("waypoint.yml"),
        "scripts:\n  - path: migrations\n",
    )
    .unwrap();

    let mut global = global();
    global.project_dir = dir.path().display().to_string();
    global.vars = vec![("k".to_string(), "v".to_string())];

    let config = load_config(&global).unwrap();
    assert_eq!(config.scripts.len(), 1);
    assert_eq!(config.variables["k"], "v");
}

#[test]
fn test_load_config_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut global = global();
    global.project_dir = dir.path().display().to_string();
    global.config = Some("other.yml".to_string());

    let err = load_config(&global).unwrap_err();
    assert!(format!("{err:#}").contains("other.yml"));
}
