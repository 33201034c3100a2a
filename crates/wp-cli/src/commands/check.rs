//! Check command implementation

use anyhow::Result;

use crate::cli::{CheckArgs, GlobalArgs};
use crate::commands::common::{build_engine, ExitCode};

/// Execute the check command
pub fn execute(_args: &CheckArgs, global: &GlobalArgs) -> Result<()> {
    let engine = build_engine(global)?;

    match engine.try_connect() {
        Ok(()) => {
            println!("Database connection OK");
            Ok(())
        }
        Err(message) => {
            eprintln!("Database connection failed: {message}");
            Err(ExitCode(1).into())
        }
    }
}
