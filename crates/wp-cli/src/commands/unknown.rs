//! Unknown command implementation

use anyhow::Result;

use crate::cli::{GlobalArgs, UnknownArgs};
use crate::commands::common::{build_engine, ExitCode};

/// Execute the unknown command
pub fn execute(args: &UnknownArgs, global: &GlobalArgs) -> Result<()> {
    let engine = build_engine(global)?;
    let unknown = engine.executed_but_not_discovered()?;

    if unknown.is_empty() {
        println!("Every journaled script is still provided");
        return Ok(());
    }

    println!("{} journaled script(s) no longer provided:", unknown.len());
    for name in &unknown {
        println!("  {name}");
    }

    if args.fail_on_unknown {
        return Err(ExitCode(2).into());
    }
    Ok(())
}
