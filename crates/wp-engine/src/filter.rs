//! Selecting which discovered scripts are due.

use crate::error::EngineResult;
use crate::prepared::PreparedScript;
use wp_core::{AppliedIndex, RunPolicy};

/// Decides which discovered scripts must run
pub trait ScriptFilter {
    /// Keep the scripts of `discovered` that are due, given the latest
    /// journal record per name in `applied`
    fn filter(
        &self,
        discovered: Vec<PreparedScript>,
        applied: &AppliedIndex,
    ) -> EngineResult<Vec<PreparedScript>>;
}

/// Run-policy based filter.
///
/// A script is due when it is RunAlways, when it has never been applied,
/// or when it is RunIfChanged and its contents differ from the snapshot of
/// its latest application.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultScriptFilter;

impl DefaultScriptFilter {
    fn is_due(script: &PreparedScript, applied: &AppliedIndex) -> EngineResult<bool> {
        if script.options().run_policy == RunPolicy::RunAlways {
            return Ok(true);
        }
        let Some(record) = applied.get(script.name()) else {
            return Ok(true);
        };
        if script.options().run_policy == RunPolicy::RunIfChanged {
            return Ok(record.contents.as_deref() != Some(script.contents()?));
        }
        Ok(false)
    }
}

impl ScriptFilter for DefaultScriptFilter {
    fn filter(
        &self,
        discovered: Vec<PreparedScript>,
        applied: &AppliedIndex,
    ) -> EngineResult<Vec<PreparedScript>> {
        let mut due = Vec::with_capacity(discovered.len());
        for script in discovered {
            if Self::is_due(&script, applied)? {
                due.push(script);
            } else {
                log::debug!("Skipping {}: already applied", script.name());
            }
        }
        Ok(due)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prepared::Preprocessing;
    use chrono::NaiveDate;
    use std::rc::Rc;
    use wp_core::{AppliedRecord, NameComparison, Script, ScriptOptions};

    fn script(name: &str, text: &str, policy: RunPolicy) -> PreparedScript {
        PreparedScript::new(
            Script::new(name, text)
                .unwrap()
                .with_options(ScriptOptions::new(policy, 0)),
            Rc::new(Preprocessing::new()),
        )
    }

    fn applied(records: &[(&str, Option<&str>)], comparison: NameComparison) -> AppliedIndex {
        let at = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        AppliedIndex::build(
            records.iter().map(|(name, contents)| {
                AppliedRecord::new(
                    *name,
                    RunPolicy::RunOnce,
                    contents.map(str::to_string),
                    at,
                )
            }),
            comparison,
        )
    }

    fn names(scripts: &[PreparedScript]) -> Vec<&str> {
        scripts.iter().map(|s| s.name()).collect()
    }

    #[test]
    fn test_run_once_skipped_once_applied_even_if_changed() {
        let due = DefaultScriptFilter
            .filter(
                vec![
                    script("a.sql", "changed", RunPolicy::RunOnce),
                    script("b.sql", "new", RunPolicy::RunOnce),
                ],
                &applied(&[("a.sql", Some("original"))], NameComparison::Ordinal),
            )
            .unwrap();
        assert_eq!(names(&due), vec!["b.sql"]);
    }

    #[test]
    fn test_run_always_always_due() {
        let due = DefaultScriptFilter
            .filter(
                vec![script("views.sql", "same", RunPolicy::RunAlways)],
                &applied(&[("views.sql", Some("same"))], NameComparison::Ordinal),
            )
            .unwrap();
        assert_eq!(names(&due), vec!["views.sql"]);
    }

    #[test]
    fn test_run_if_changed_compares_contents() {
        let index = applied(
            &[
                ("same.sql", Some("SELECT 1")),
                ("drift.sql", Some("SELECT 1")),
                ("nosnap.sql", None),
            ],
            NameComparison::Ordinal,
        );
        let due = DefaultScriptFilter
            .filter(
                vec![
                    script("same.sql", "SELECT 1", RunPolicy::RunIfChanged),
                    script("drift.sql", "SELECT 2", RunPolicy::RunIfChanged),
                    script("nosnap.sql", "SELECT 1", RunPolicy::RunIfChanged),
                ],
                &index,
            )
            .unwrap();
        assert_eq!(names(&due), vec!["drift.sql", "nosnap.sql"]);
    }

    #[test]
    fn test_name_lookup_follows_comparison_policy() {
        let discovered = || vec![script("A.SQL", "x", RunPolicy::RunOnce)];

        let ordinal = applied(&[("a.sql", Some("x"))], NameComparison::Ordinal);
        assert_eq!(DefaultScriptFilter.filter(discovered(), &ordinal).unwrap().len(), 1);

        let ignore_case = applied(&[("a.sql", Some("x"))], NameComparison::OrdinalIgnoreCase);
        assert!(DefaultScriptFilter
            .filter(discovered(), &ignore_case)
            .unwrap()
            .is_empty());
    }
}
