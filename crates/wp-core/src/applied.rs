//! Journal records of applied scripts.

use crate::names::NameComparison;
use crate::script::RunPolicy;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::HashMap;

/// A script application as recorded in the journal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedRecord {
    /// Script name
    pub name: String,

    /// Run policy at the time the script was applied
    pub run_policy: RunPolicy,

    /// Content snapshot, if the journal keeps one
    pub contents: Option<String>,

    /// When the script was applied
    pub applied_at: NaiveDateTime,

    /// Who applied the script, if recorded
    pub applied_by: Option<String>,
}

impl AppliedRecord {
    /// Create a record
    pub fn new(
        name: impl Into<String>,
        run_policy: RunPolicy,
        contents: Option<String>,
        applied_at: NaiveDateTime,
    ) -> Self {
        Self {
            name: name.into(),
            run_policy,
            contents,
            applied_at,
            applied_by: None,
        }
    }

    /// Set who applied the script
    pub fn with_applied_by(mut self, applied_by: Option<String>) -> Self {
        self.applied_by = applied_by;
        self
    }
}

/// Latest applied record per script name.
///
/// Several historical rows may exist for one name; only the most recently
/// applied one is authoritative. On equal timestamps the record seen last
/// wins.
#[derive(Debug, Clone)]
pub struct AppliedIndex {
    comparison: NameComparison,
    latest: HashMap<String, AppliedRecord>,
}

impl AppliedIndex {
    /// Group `records` by name under `comparison`, keeping the latest of each
    pub fn build(
        records: impl IntoIterator<Item = AppliedRecord>,
        comparison: NameComparison,
    ) -> Self {
        let mut latest: HashMap<String, AppliedRecord> = HashMap::new();
        for record in records {
            let key = comparison.key(&record.name).into_owned();
            match latest.get(&key) {
                Some(existing) if existing.applied_at > record.applied_at => {}
                _ => {
                    latest.insert(key, record);
                }
            }
        }
        Self { comparison, latest }
    }

    /// Latest record for `name`
    pub fn get(&self, name: &str) -> Option<&AppliedRecord> {
        self.latest.get(self.comparison.key(name).as_ref())
    }

    /// Whether any record exists for `name`
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of distinct script names
    pub fn len(&self) -> usize {
        self.latest.len()
    }

    /// Whether the journal had no records
    pub fn is_empty(&self) -> bool {
        self.latest.is_empty()
    }

    /// Latest records, ordered by name under the index's policy
    pub fn records(&self) -> Vec<&AppliedRecord> {
        let mut records: Vec<&AppliedRecord> = self.latest.values().collect();
        records.sort_by(|a, b| self.comparison.compare(&a.name, &b.name));
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn record(name: &str, contents: &str, hour: u32) -> AppliedRecord {
        AppliedRecord::new(
            name,
            RunPolicy::RunIfChanged,
            Some(contents.to_string()),
            at(hour),
        )
    }

    #[test]
    fn test_latest_record_wins() {
        let index = AppliedIndex::build(
            vec![
                record("view.sql", "v2", 10),
                record("view.sql", "v1", 8),
                record("view.sql", "v3", 12),
            ],
            NameComparison::Ordinal,
        );

        assert_eq!(index.len(), 1);
        assert_eq!(
            index.get("view.sql").unwrap().contents.as_deref(),
            Some("v3")
        );
    }

    #[test]
    fn test_grouping_uses_comparison_policy() {
        let records = vec![record("View.sql", "old", 1), record("view.sql", "new", 2)];

        let ordinal = AppliedIndex::build(records.clone(), NameComparison::Ordinal);
        assert_eq!(ordinal.len(), 2);

        let ignore_case = AppliedIndex::build(records, NameComparison::OrdinalIgnoreCase);
        assert_eq!(ignore_case.len(), 1);
        assert_eq!(
            ignore_case.get("VIEW.SQL").unwrap().contents.as_deref(),
            Some("new")
        );
    }

    #[test]
    fn test_records_sorted_by_name() {
        let index = AppliedIndex::build(
            vec![record("b.sql", "", 1), record("a.sql", "", 1)],
            NameComparison::Ordinal,
        );
        let names: Vec<&str> = index.records().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a.sql", "b.sql"]);
    }
}
