//! Status command implementation

use anyhow::Result;
use wp_engine::ExecutedScript;

use crate::cli::{GlobalArgs, StatusArgs};
use crate::commands::common::{build_engine, print_json, ExitCode};

/// Execute the status command
pub fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let engine = build_engine(global)?;
    let pending: Vec<ExecutedScript> = engine
        .scripts_to_execute()?
        .iter()
        .map(ExecutedScript::from)
        .collect();

    if args.json {
        print_json(&pending)?;
    } else if pending.is_empty() {
        println!("No pending scripts");
    } else {
        println!("{} pending script(s):", pending.len());
        for script in &pending {
            println!(
                "  [{:>3}] {:<12} {}",
                script.run_group_order,
                script.run_policy.as_tag(),
                script.name
            );
        }
    }

    if args.fail_on_pending && !pending.is_empty() {
        return Err(ExitCode(2).into());
    }
    Ok(())
}
