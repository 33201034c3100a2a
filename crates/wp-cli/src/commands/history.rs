//! History command implementation

use anyhow::Result;
use serde::Serialize;
use wp_core::{AppliedRecord, RunPolicy};

use crate::cli::{GlobalArgs, HistoryArgs};
use crate::commands::common::{build_engine, print_json};

/// Journal entry as shown to the user; content snapshots are left out
#[derive(Debug, Serialize)]
struct HistoryEntry<'a> {
    name: &'a str,
    run_policy: RunPolicy,
    applied_at: String,
    applied_by: Option<&'a str>,
}

impl<'a> From<&'a AppliedRecord> for HistoryEntry<'a> {
    fn from(record: &'a AppliedRecord) -> Self {
        Self {
            name: &record.name,
            run_policy: record.run_policy,
            applied_at: record.applied_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            applied_by: record.applied_by.as_deref(),
        }
    }
}

/// Execute the history command
pub fn execute(args: &HistoryArgs, global: &GlobalArgs) -> Result<()> {
    let engine = build_engine(global)?;
    let records = if args.latest {
        engine.executed_scripts()?
    } else {
        engine.history()?
    };
    let entries: Vec<HistoryEntry> = records.iter().map(HistoryEntry::from).collect();

    if args.json {
        return print_json(&entries);
    }

    if entries.is_empty() {
        println!("No scripts have been applied");
        return Ok(());
    }

    println!(
        "{:<19}  {:<12}  {:<12}  NAME",
        "APPLIED AT", "POLICY", "APPLIED BY"
    );
    for entry in &entries {
        println!(
            "{:<19}  {:<12}  {:<12}  {}",
            entry.applied_at,
            entry.run_policy.as_tag(),
            entry.applied_by.unwrap_or("-"),
            entry.name
        );
    }
    Ok(())
}
