//! Script name comparison policy.
//!
//! One [`NameComparison`] value is shared by the filter, the sorter and the
//! journal grouping so that a script is identified the same way everywhere.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::cmp::Ordering;

/// How script names are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameComparison {
    /// Exact, case-sensitive comparison (default)
    #[default]
    Ordinal,
    /// Case-insensitive comparison on upper-cased names
    OrdinalIgnoreCase,
}

impl NameComparison {
    /// Normalized lookup key for `name`
    pub fn key<'a>(&self, name: &'a str) -> Cow<'a, str> {
        match self {
            NameComparison::Ordinal => Cow::Borrowed(name),
            NameComparison::OrdinalIgnoreCase => Cow::Owned(name.to_uppercase()),
        }
    }

    /// Whether two names identify the same script
    pub fn equals(&self, a: &str, b: &str) -> bool {
        self.key(a) == self.key(b)
    }

    /// Total order over names.
    ///
    /// Names that are equal under the policy fall back to ordinal order so
    /// sorting stays deterministic.
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        self.key(a).cmp(&self.key(b)).then_with(|| a.cmp(b))
    }
}
