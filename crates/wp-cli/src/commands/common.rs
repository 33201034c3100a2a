//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use wp_core::Config;
use wp_engine::UpgradeEngine;

use crate::cli::GlobalArgs;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and cleanup happens properly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "exit code {}", self.0)
    }
}

impl std::error::Error for ExitCode {}

/// Load the project configuration with command line overrides applied
pub(crate) fn load_config(global: &GlobalArgs) -> Result<Config> {
    let project_dir = project_dir(global);
    let mut config = match &global.config {
        Some(path) => Config::load(&project_dir.join(path)),
        None => Config::load_from_dir(&project_dir),
    }
    .context("Failed to load project configuration")?;

    apply_overrides(&mut config, global, default_applied_by());
    Ok(config)
}

/// Merge `--database` and `--var` into the loaded configuration.
///
/// Command line variables replace config variables with the same name.
pub(crate) fn apply_overrides(config: &mut Config, global: &GlobalArgs, applied_by: Option<String>) {
    if let Some(database) = &global.database {
        config.database.path = database.clone();
    }
    for (key, value) in &global.vars {
        config.variables.insert(key.clone(), value.clone());
    }
    if config.journal.applied_by.is_none() {
        config.journal.applied_by = applied_by;
    }
}

/// Build the upgrade engine for the project
pub(crate) fn build_engine(global: &GlobalArgs) -> Result<UpgradeEngine> {
    let config = load_config(global)?;
    log::debug!(
        "Using database '{}' with {} script location(s)",
        config.database.path,
        config.scripts.len()
    );
    wp_engine::upgrader(&config, &project_dir(global)).context("Failed to set up the upgrader")
}

/// Project directory from the global arguments
pub(crate) fn project_dir(global: &GlobalArgs) -> PathBuf {
    Path::new(&global.project_dir).to_path_buf()
}

fn default_applied_by() -> Option<String> {
    ["USER", "USERNAME"]
        .iter()
        .find_map(|var| std::env::var(var).ok())
        .filter(|name| !name.trim().is_empty())
}

/// Print a value as pretty JSON on stdout
pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
