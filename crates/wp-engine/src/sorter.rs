//! Ordering the scripts that are due.

use crate::prepared::PreparedScript;
use wp_core::NameComparison;

/// Imposes the execution order on due scripts
pub trait ScriptSorter {
    fn sort(&self, scripts: Vec<PreparedScript>, comparison: NameComparison)
        -> Vec<PreparedScript>;
}

/// Orders by run group, then by name under the comparison policy
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultScriptSorter;

impl ScriptSorter for DefaultScriptSorter {
    fn sort(
        &self,
        mut scripts: Vec<PreparedScript>,
        comparison: NameComparison,
    ) -> Vec<PreparedScript> {
        scripts.sort_by(|a, b| {
            a.options()
                .run_group_order
                .cmp(&b.options().run_group_order)
                .then_with(|| comparison.compare(a.name(), b.name()))
        });
        scripts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prepared::Preprocessing;
    use std::rc::Rc;
    use wp_core::{RunPolicy, Script, ScriptOptions};

    fn script(name: &str, group: i32) -> PreparedScript {
        PreparedScript::new(
            Script::new(name, "SELECT 1")
                .unwrap()
                .with_options(ScriptOptions::new(RunPolicy::RunOnce, group)),
            Rc::new(Preprocessing::new()),
        )
    }

    fn order(scripts: Vec<PreparedScript>, comparison: NameComparison) -> Vec<String> {
        DefaultScriptSorter
            .sort(scripts, comparison)
            .iter()
            .map(|s| s.name().to_string())
            .collect()
    }

    #[test]
    fn test_group_then_name() {
        let sorted = order(
            vec![script("B", 0), script("A", 0), script("C", -1)],
            NameComparison::Ordinal,
        );
        assert_eq!(sorted, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_deterministic_across_input_orders() {
        let first = order(
            vec![script("002.sql", 1), script("001.sql", 1), script("010.sql", 0)],
            NameComparison::Ordinal,
        );
        let second = order(
            vec![script("010.sql", 0), script("001.sql", 1), script("002.sql", 1)],
            NameComparison::Ordinal,
        );
        assert_eq!(first, second);
        assert_eq!(first, vec!["010.sql", "001.sql", "002.sql"]);
    }

    #[test]
    fn test_ignore_case_ordering() {
        let ordinal = order(
            vec![script("b.sql", 0), script("A.sql", 0), script("a.sql", 0)],
            NameComparison::Ordinal,
        );
        assert_eq!(ordinal, vec!["A.sql", "a.sql", "b.sql"]);

        let ignore_case = order(
            vec![script("b.sql", 0), script("a.sql", 0), script("A.sql", 0)],
            NameComparison::OrdinalIgnoreCase,
        );
        assert_eq!(ignore_case, vec!["A.sql", "a.sql", "b.sql"]);
    }
}
