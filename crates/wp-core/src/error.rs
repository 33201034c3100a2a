//! Error types for wp-core

use thiserror::Error;

/// Core error type for Waypoint
#[derive(Error, Debug)]
pub enum CoreError {
    /// C001: Configuration file not found
    #[error("[C001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// C002: Failed to parse configuration file
    #[error("[C002] Failed to parse config: {message}")]
    ConfigParseError { message: String },

    /// C003: Invalid configuration value
    #[error("[C003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// C004: Script name is empty
    #[error("[C004] Script name cannot be empty")]
    EmptyScriptName,

    /// C005: Script content could not be loaded
    #[error("[C005] Failed to load contents of script '{name}': {source}")]
    ScriptContent {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// C006: Script content is not valid UTF-8
    #[error("[C006] Script '{name}' is not valid UTF-8: {message}")]
    ScriptEncoding { name: String, message: String },

    /// C007: File path is outside of the discovery root
    #[error("[C007] '{path}' is not inside base directory '{base}'")]
    PathOutsideBase { base: String, path: String },

    /// C008: Unknown run policy tag
    #[error("[C008] Unsupported run policy: {tag}")]
    UnknownRunPolicy { tag: String },

    /// C009: Script directory could not be read
    #[error("[C009] Failed to read script directory {path}: {source}")]
    ScriptDirectory {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// IO error with file path context
    #[error("IO error at {path}: {source}")]
    IoWithPath {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl From<serde_yaml::Error> for CoreError {
    fn from(err: serde_yaml::Error) -> Self {
        CoreError::ConfigParseError {
            message: err.to_string(),
        }
    }
}
