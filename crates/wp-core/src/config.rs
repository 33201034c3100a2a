//! Configuration types and parsing for waypoint.yml

use crate::error::{CoreError, CoreResult};
use crate::names::NameComparison;
use crate::script::{RunPolicy, ScriptOptions};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Main project configuration from waypoint.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Schema the scripts target; created before execution when set
    #[serde(default)]
    pub schema: Option<String>,

    /// Journal settings
    #[serde(default)]
    pub journal: JournalConfig,

    /// Where to discover scripts
    pub scripts: Vec<ScriptLocation>,

    /// Transaction scope around script execution
    #[serde(default)]
    pub transaction: TransactionMode,

    /// Whether `$__var__$name$__var__$` placeholders are substituted
    #[serde(default = "default_true")]
    pub variables_enabled: bool,

    /// Values for variable placeholders
    #[serde(default)]
    pub variables: HashMap<String, String>,

    /// Batch delimiter used to split scripts
    #[serde(default)]
    pub batch_delimiter: BatchDelimiterConfig,

    /// Script name comparison policy
    #[serde(default)]
    pub name_comparison: NameComparison,
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Database path (DuckDB file or `:memory:`)
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Journal flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum JournalKind {
    /// Records name, policy, timestamp and content (default)
    #[default]
    Full,
    /// Records name and timestamp only
    Simple,
}

/// Journal table configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JournalConfig {
    /// Journal flavour
    #[serde(default)]
    pub kind: JournalKind,

    /// Schema holding the journal tables
    #[serde(default)]
    pub schema: Option<String>,

    /// Journal table name
    #[serde(default = "default_journal_table")]
    pub table: String,

    /// Recorded as `applied_by` on every entry
    #[serde(default)]
    pub applied_by: Option<String>,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            kind: JournalKind::default(),
            schema: None,
            table: default_journal_table(),
            applied_by: None,
        }
    }
}

/// Transaction scope around script execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransactionMode {
    /// Statements auto-commit individually
    None,
    /// One transaction per script, including its journal entry (default)
    #[default]
    PerScript,
    /// One transaction for the whole upgrade
    PerRun,
}

impl std::fmt::Display for TransactionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionMode::None => write!(f, "none"),
            TransactionMode::PerScript => write!(f, "per_script"),
            TransactionMode::PerRun => write!(f, "per_run"),
        }
    }
}

/// A directory of scripts and the options applied to them
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptLocation {
    /// Directory, relative to the project root
    pub path: String,

    /// Run policy for every script found here
    #[serde(default)]
    pub run_policy: RunPolicy,

    /// Run group for every script found here
    #[serde(default)]
    pub run_group_order: i32,

    /// Descend into subdirectories
    #[serde(default)]
    pub recursive: bool,

    /// File extension filter
    #[serde(default = "default_extension")]
    pub extension: Option<String>,
}

impl ScriptLocation {
    /// Options applied to scripts from this location
    pub fn options(&self) -> ScriptOptions {
        ScriptOptions::new(self.run_policy, self.run_group_order)
    }
}

/// Batch delimiter settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchDelimiterConfig {
    /// Delimiter marker
    #[serde(default = "default_delimiter")]
    pub marker: String,

    /// Whether the marker must stand alone on its line
    #[serde(default = "default_true")]
    pub requires_whitespace: bool,
}

impl Default for BatchDelimiterConfig {
    fn default() -> Self {
        Self {
            marker: default_delimiter(),
            requires_whitespace: true,
        }
    }
}

const DEFAULT_DB_PATH: &str = ":memory:";

const CONFIG_FILE_NAMES: &[&str] = &["waypoint.yml", "waypoint.yaml"];

fn default_db_path() -> String {
    DEFAULT_DB_PATH.to_string()
}

fn default_journal_table() -> String {
    "schemaversions".to_string()
}

fn default_extension() -> Option<String> {
    Some("sql".to_string())
}

fn default_delimiter() -> String {
    "GO".to_string()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parse and validate configuration text
    pub fn parse(content: &str) -> CoreResult<Self> {
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory
    /// Looks for waypoint.yml or waypoint.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        for name in CONFIG_FILE_NAMES {
            let candidate = dir.join(name);
            if candidate.exists() {
                return Self::load(&candidate);
            }
        }
        Err(CoreError::ConfigNotFound {
            path: dir.join(CONFIG_FILE_NAMES[0]).display().to_string(),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        if self.scripts.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "At least one scripts entry must be specified".to_string(),
            });
        }

        if let Some(location) = self.scripts.iter().find(|l| l.path.trim().is_empty()) {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "Script location path cannot be empty (run_group_order {})",
                    location.run_group_order
                ),
            });
        }

        if self.journal.table.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "Journal table name cannot be empty".to_string(),
            });
        }

        if self.batch_delimiter.marker.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "Batch delimiter marker cannot be empty".to_string(),
            });
        }

        if matches!(&self.schema, Some(s) if s.trim().is_empty()) {
            return Err(CoreError::ConfigInvalid {
                message: "Schema cannot be an empty string; omit it instead".to_string(),
            });
        }

        Ok(())
    }

    /// Get absolute script directories relative to a project root
    pub fn script_paths_absolute(&self, root: &Path) -> Vec<(PathBuf, &ScriptLocation)> {
        self.scripts
            .iter()
            .map(|location| (root.join(&location.path), location))
            .collect()
    }

    /// Schema holding the journal; falls back to the script schema
    pub fn journal_schema(&self) -> Option<&str> {
        self.journal.schema.as_deref().or(self.schema.as_deref())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
