//! Variable placeholder substitution.
//!
//! Placeholders have the form `<delim>name<delim>`, by default
//! `$__var__$name$__var__$`, where `name` is made of letters, digits, `_`
//! and `-`. Only placeholders in code are substituted: text inside string
//! literals, quoted identifiers and comments passes through untouched.

use crate::error::{SqlError, SqlResult};
use crate::scanner::{CustomMatch, CustomStatement, QuoteRules, Scanner, Token};
use std::collections::HashMap;

/// Default placeholder delimiter
pub const DEFAULT_VARIABLE_DELIMITER: &str = "$__var__$";

/// Recognises variable placeholders for the scanner
#[derive(Debug, Clone)]
pub struct VariablePlaceholder {
    delimiter: Vec<char>,
}

impl VariablePlaceholder {
    /// Placeholder syntax with a custom delimiter
    pub fn new(delimiter: &str) -> SqlResult<Self> {
        if delimiter.is_empty() {
            return Err(SqlError::InvalidDelimiter(
                "variable delimiter cannot be empty".to_string(),
            ));
        }
        if delimiter.chars().any(is_name_char) && delimiter.chars().all(is_name_char) {
            return Err(SqlError::InvalidDelimiter(format!(
                "variable delimiter '{delimiter}' is indistinguishable from a variable name"
            )));
        }
        Ok(Self {
            delimiter: delimiter.chars().collect(),
        })
    }
}

impl Default for VariablePlaceholder {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_VARIABLE_DELIMITER.chars().collect(),
        }
    }
}

impl CustomStatement for VariablePlaceholder {
    fn recognize(&self, input: &[char]) -> Option<CustomMatch> {
        let width = self.delimiter.len();
        if !input.starts_with(&self.delimiter) {
            return None;
        }

        let name_len = input[width..]
            .iter()
            .take_while(|c| is_name_char(**c))
            .count();
        if name_len == 0 {
            return None;
        }

        let close = width + name_len;
        if !input[close..].starts_with(&self.delimiter) {
            return None;
        }

        Some(CustomMatch {
            len: close + width,
            value: input[width..close].iter().collect(),
        })
    }
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

/// Replace every placeholder in `sql` with its value from `variables`.
///
/// Fails on the first placeholder whose name is missing; no partially
/// substituted text is returned.
pub fn substitute_variables(sql: &str, variables: &HashMap<String, String>) -> SqlResult<String> {
    substitute_with(
        sql,
        variables,
        &VariablePlaceholder::default(),
        QuoteRules::default(),
    )
}

/// [`substitute_variables`] with an explicit placeholder syntax and
/// quoting rules
pub fn substitute_with(
    sql: &str,
    variables: &HashMap<String, String>,
    placeholder: &VariablePlaceholder,
    rules: QuoteRules,
) -> SqlResult<String> {
    Scanner::new(sql)
        .with_custom(placeholder)
        .with_quote_rules(rules)
        .try_fold(String::with_capacity(sql.len()), |mut out, token| {
            match token {
                Token::Char { ch, .. } => out.push(ch),
                Token::Custom { value, .. } => match variables.get(&value) {
                    Some(replacement) => out.push_str(replacement),
                    None => return Err(SqlError::UnresolvedVariable { name: value }),
                },
                Token::Delimiter => {}
            }
            Ok(out)
        })
}

#[cfg(test)]
#[path = "variables_test.rs"]
mod tests;
