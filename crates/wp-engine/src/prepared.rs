//! Scripts prepared for one engine invocation.
//!
//! A [`PreparedScript`] pairs a discovered [`Script`] with the
//! [`Preprocessing`] of the run. Its contents are computed once, on first
//! use, and frozen for the rest of the invocation.

use crate::error::{EngineError, EngineResult};
use std::cell::OnceCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use wp_core::{Script, ScriptOptions};
use wp_sql::{substitute_with, QuoteRules, VariablePlaceholder};

/// Name of the variable that resolves to the configured schema
pub const SCHEMA_VARIABLE: &str = "schema";

/// A transformation applied to script text before execution
pub trait ScriptPreprocessor {
    fn process(&self, contents: &str) -> EngineResult<String>;
}

impl<F> ScriptPreprocessor for F
where
    F: Fn(&str) -> EngineResult<String>,
{
    fn process(&self, contents: &str) -> EngineResult<String> {
        self(contents)
    }
}

/// How raw script text becomes executable text
pub struct Preprocessing {
    variables: HashMap<String, String>,
    variables_enabled: bool,
    quote_rules: QuoteRules,
    preprocessors: Vec<Box<dyn ScriptPreprocessor>>,
}

impl Preprocessing {
    pub fn new() -> Self {
        Self {
            variables: HashMap::new(),
            variables_enabled: true,
            quote_rules: QuoteRules::default(),
            preprocessors: Vec::new(),
        }
    }

    /// Add or replace variables
    pub fn with_variables(mut self, variables: HashMap<String, String>) -> Self {
        self.variables.extend(variables);
        self
    }

    /// Set a single variable
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    /// Make `schema` resolve to `quoted_schema` unless already set
    pub fn with_schema_variable(mut self, quoted_schema: impl Into<String>) -> Self {
        self.variables
            .entry(SCHEMA_VARIABLE.to_string())
            .or_insert_with(|| quoted_schema.into());
        self
    }

    /// Turn variable substitution on or off
    pub fn variables_enabled(mut self, enabled: bool) -> Self {
        self.variables_enabled = enabled;
        self
    }

    /// Quoting rules used to find placeholders outside literals
    pub fn with_quote_rules(mut self, rules: QuoteRules) -> Self {
        self.quote_rules = rules;
        self
    }

    /// Run `preprocessor` after substitution; preprocessors run in the
    /// order they were added
    pub fn with_preprocessor(mut self, preprocessor: impl ScriptPreprocessor + 'static) -> Self {
        self.preprocessors.push(Box::new(preprocessor));
        self
    }

    /// Apply substitution and every preprocessor to `contents`
    pub fn apply(&self, contents: &str) -> EngineResult<String> {
        let mut text = if self.variables_enabled {
            substitute_with(
                contents,
                &self.variables,
                &VariablePlaceholder::default(),
                self.quote_rules,
            )?
        } else {
            contents.to_string()
        };
        for preprocessor in &self.preprocessors {
            text = preprocessor.process(&text)?;
        }
        Ok(text)
    }
}

impl Default for Preprocessing {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Preprocessing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Preprocessing")
            .field("variables", &self.variables)
            .field("variables_enabled", &self.variables_enabled)
            .field("quote_rules", &self.quote_rules)
            .field("preprocessors", &self.preprocessors.len())
            .finish()
    }
}

/// A script with the preprocessing of the current run attached
pub struct PreparedScript {
    script: Script,
    preprocessing: Rc<Preprocessing>,
    contents: OnceCell<String>,
}

impl PreparedScript {
    pub fn new(script: Script, preprocessing: Rc<Preprocessing>) -> Self {
        Self {
            script,
            preprocessing,
            contents: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &str {
        self.script.name()
    }

    pub fn options(&self) -> ScriptOptions {
        self.script.options()
    }

    /// The underlying discovered script
    pub fn script(&self) -> &Script {
        &self.script
    }

    /// Preprocessed contents, computed on first call and frozen afterwards.
    ///
    /// Errors (unreadable source, unresolved variable) are returned on every
    /// call until a computation succeeds.
    pub fn contents(&self) -> EngineResult<&str> {
        if let Some(frozen) = self.contents.get() {
            return Ok(frozen);
        }
        let processed = self
            .preprocessing
            .apply(self.script.contents()?)
            .map_err(|err| match err {
                EngineError::Preprocessing { message } => EngineError::Preprocessing {
                    message: format!("{}: {message}", self.name()),
                },
                other => other,
            })?;
        Ok(self.contents.get_or_init(|| processed))
    }
}

impl fmt::Debug for PreparedScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreparedScript")
            .field("name", &self.name())
            .field("options", &self.options())
            .field("frozen", &self.contents.get().is_some())
            .finish()
    }
}

#[cfg(test)]
#[path = "prepared_test.rs"]
mod tests;
