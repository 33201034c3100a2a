//! Command implementations

pub mod check;
pub mod common;
pub mod history;
pub mod mark_executed;
pub mod status;
pub mod unknown;
pub mod upgrade;
