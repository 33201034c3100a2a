//! wp-sql - Script text processing for Waypoint
//!
//! Context-aware scanning of SQL script text: splitting scripts into
//! batches at a delimiter and substituting variable placeholders, both of
//! which ignore string literals, quoted identifiers and comments.

pub mod batch;
pub mod error;
pub mod scanner;
pub mod variables;

pub use batch::split_batches;
pub use error::{SqlError, SqlResult};
pub use scanner::{
    BatchDelimiter, CharClass, CustomMatch, CustomStatement, QuoteRules, Scanner, Token,
};
pub use variables::{
    substitute_variables, substitute_with, VariablePlaceholder,
    DEFAULT_VARIABLE_DELIMITER,
};
