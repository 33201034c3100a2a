//! wp-core - Core library for Waypoint
//!
//! This crate provides the change script model, run policies, the script
//! name comparison policy, journal records, script discovery and project
//! configuration shared by the other Waypoint crates.

pub mod applied;
pub mod config;
pub mod error;
pub mod names;
pub mod provider;
pub mod script;

pub use applied::{AppliedIndex, AppliedRecord};
pub use config::{
    BatchDelimiterConfig, Config, DatabaseConfig, JournalConfig, JournalKind, ScriptLocation,
    TransactionMode,
};
pub use error::{CoreError, CoreResult};
pub use names::NameComparison;
pub use provider::{FileSystemScriptProvider, ScriptProvider, StaticScriptProvider};
pub use script::{RunPolicy, Script, ScriptOptions};
