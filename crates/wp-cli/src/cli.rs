//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand};

/// Waypoint - apply versioned SQL change scripts to a DuckDB database
#[derive(Parser, Debug)]
#[command(name = "wp")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Override the database path from the config
    #[arg(short, long, global = true, env = "WAYPOINT_DATABASE")]
    pub database: Option<String>,

    /// Set a script variable (KEY=VALUE, repeatable)
    #[arg(long = "var", global = true, value_name = "KEY=VALUE", value_parser = parse_var)]
    pub vars: Vec<(String, String)>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply all pending scripts
    Upgrade(UpgradeArgs),

    /// List scripts that the next upgrade would run
    Status(StatusArgs),

    /// Show every script application recorded in the journal
    History(HistoryArgs),

    /// List journaled scripts that no script location provides anymore
    Unknown(UnknownArgs),

    /// Record pending scripts as applied without running them
    MarkExecuted(MarkExecutedArgs),

    /// Verify that the database can be opened
    Check(CheckArgs),
}

/// Arguments for the upgrade command
#[derive(Args, Debug)]
pub struct UpgradeArgs {
    /// Print the outcome as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Print pending scripts as JSON
    #[arg(long)]
    pub json: bool,

    /// Exit with code 2 when scripts are pending
    #[arg(long)]
    pub fail_on_pending: bool,
}

/// Arguments for the history command
#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Print history as JSON
    #[arg(long)]
    pub json: bool,

    /// Only show the latest application of each script
    #[arg(long)]
    pub latest: bool,
}

/// Arguments for the unknown command
#[derive(Args, Debug)]
pub struct UnknownArgs {
    /// Exit with code 2 when unknown scripts exist
    #[arg(long)]
    pub fail_on_unknown: bool,
}

/// Arguments for the mark-executed command
#[derive(Args, Debug)]
pub struct MarkExecutedArgs {
    /// Stop after marking this script (inclusive)
    #[arg(long)]
    pub up_to: Option<String>,
}

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {}

/// Parse a `KEY=VALUE` pair; the value may itself contain `=`
pub fn parse_var(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("variable name missing in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
