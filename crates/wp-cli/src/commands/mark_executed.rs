//! Mark-executed command implementation

use anyhow::Result;

use crate::cli::{GlobalArgs, MarkExecutedArgs};
use crate::commands::common::{build_engine, ExitCode};

/// Execute the mark-executed command
pub fn execute(args: &MarkExecutedArgs, global: &GlobalArgs) -> Result<()> {
    let engine = build_engine(global)?;
    let result = engine.mark_as_executed(args.up_to.as_deref());

    for script in result.scripts() {
        println!("  Marked: {}", script.name);
    }

    if let Some(error) = result.error() {
        eprintln!("Marking scripts failed: {error}");
        return Err(ExitCode(1).into());
    }

    println!("{} script(s) marked as executed", result.scripts().len());
    Ok(())
}
