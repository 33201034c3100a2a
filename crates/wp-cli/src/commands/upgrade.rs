//! Upgrade command implementation

use anyhow::Result;
use serde::Serialize;
use wp_engine::{ExecutedScript, UpgradeResult};

use crate::cli::{GlobalArgs, UpgradeArgs};
use crate::commands::common::{build_engine, print_json, ExitCode};

#[derive(Debug, Serialize)]
struct UpgradeReport<'a> {
    successful: bool,
    scripts: &'a [ExecutedScript],
    error: Option<String>,
    error_script: Option<&'a ExecutedScript>,
}

impl<'a> From<&'a UpgradeResult> for UpgradeReport<'a> {
    fn from(result: &'a UpgradeResult) -> Self {
        Self {
            successful: result.successful(),
            scripts: result.scripts(),
            error: result.error().map(|e| e.to_string()),
            error_script: result.error_script(),
        }
    }
}

/// Execute the upgrade command
pub fn execute(args: &UpgradeArgs, global: &GlobalArgs) -> Result<()> {
    let mut engine = build_engine(global)?;
    if !args.json {
        engine = engine.on_script_executed(|script| println!("  Applied: {}", script.name()));
    }

    let result = engine.perform_upgrade();

    if args.json {
        print_json(&UpgradeReport::from(&result))?;
    } else {
        print_summary(&result);
    }

    if !result.successful() {
        return Err(ExitCode(1).into());
    }
    Ok(())
}

fn print_summary(result: &UpgradeResult) {
    if result.successful() {
        match result.scripts().len() {
            0 => println!("Database is up to date"),
            n => println!("Upgrade complete: {n} script(s) applied"),
        }
        return;
    }

    let script = result
        .error_script()
        .map(|s| s.name.as_str())
        .unwrap_or("<none>");
    eprintln!("Upgrade failed at script {script}");
    if let Some(error) = result.error() {
        eprintln!("  {error}");
    }
    if !result.scripts().is_empty() {
        eprintln!("  {} script(s) ran before the failure", result.scripts().len());
    }
}
