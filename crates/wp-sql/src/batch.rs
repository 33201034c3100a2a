//! Splitting script text into executable batches.

use crate::scanner::{BatchDelimiter, QuoteRules, Scanner, Token};

/// Split `sql` at every batch delimiter that appears in code.
///
/// Batches are trimmed; empty batches (consecutive delimiters, leading or
/// trailing delimiters, whitespace-only text) are dropped.
pub fn split_batches(sql: &str, delimiter: &BatchDelimiter, rules: QuoteRules) -> Vec<String> {
    let mut batches = Vec::new();
    let mut current = String::new();

    for token in Scanner::new(sql)
        .with_delimiter(delimiter)
        .with_quote_rules(rules)
    {
        match token {
            Token::Char { ch, .. } => current.push(ch),
            Token::Custom { text, .. } => current.push_str(&text),
            Token::Delimiter => flush(&mut batches, &mut current),
        }
    }
    flush(&mut batches, &mut current);

    batches
}

fn flush(batches: &mut Vec<String>, current: &mut String) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        batches.push(trimmed.to_string());
    }
    current.clear();
}
