//! Outcome of an engine invocation.

use crate::error::EngineError;
use crate::prepared::PreparedScript;
use serde::Serialize;
use wp_core::RunPolicy;

/// Identity of a script that was executed (or marked as executed)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutedScript {
    pub name: String,
    pub run_policy: RunPolicy,
    pub run_group_order: i32,
}

impl From<&PreparedScript> for ExecutedScript {
    fn from(script: &PreparedScript) -> Self {
        let options = script.options();
        Self {
            name: script.name().to_string(),
            run_policy: options.run_policy,
            run_group_order: options.run_group_order,
        }
    }
}

/// Result of an upgrade or a mark-as-executed run.
///
/// A failed run still lists the scripts completed before the failure and
/// names the script that was in flight.
#[derive(Debug)]
pub struct UpgradeResult {
    scripts: Vec<ExecutedScript>,
    successful: bool,
    error: Option<EngineError>,
    error_script: Option<ExecutedScript>,
}

impl UpgradeResult {
    pub fn success(scripts: Vec<ExecutedScript>) -> Self {
        Self {
            scripts,
            successful: true,
            error: None,
            error_script: None,
        }
    }

    pub fn failure(
        scripts: Vec<ExecutedScript>,
        error: EngineError,
        error_script: Option<ExecutedScript>,
    ) -> Self {
        Self {
            scripts,
            successful: false,
            error: Some(error),
            error_script,
        }
    }

    /// Scripts executed, in execution order
    pub fn scripts(&self) -> &[ExecutedScript] {
        &self.scripts
    }

    pub fn successful(&self) -> bool {
        self.successful
    }

    /// The failure that ended the run
    pub fn error(&self) -> Option<&EngineError> {
        self.error.as_ref()
    }

    /// The script executing when the run failed
    pub fn error_script(&self) -> Option<&ExecutedScript> {
        self.error_script.as_ref()
    }
}
