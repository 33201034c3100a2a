//! Lexical scanner for script text.
//!
//! [`Scanner`] walks script text one character at a time and yields a
//! [`Token`] per character, tagged with the lexical context it was found in.
//! Two structural tokens are recognised only in plain code (never inside
//! string literals, quoted identifiers or comments):
//!
//! - a batch delimiter (e.g. `GO` on its own line), yielded as
//!   [`Token::Delimiter`] in place of its characters;
//! - a custom statement recognised by a [`CustomStatement`] hook, yielded
//!   whole as [`Token::Custom`].
//!
//! Unterminated literals or comments simply run to the end of the input.

use crate::error::{SqlError, SqlResult};
use std::collections::VecDeque;

/// Lexical class of a scanned character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    /// Plain statement text
    Code,
    /// Whitespace outside literals and comments
    Whitespace,
    /// Inside a single-quoted string literal, quotes included
    QuotedString,
    /// Inside a `"..."` or `[...]` identifier, delimiters included
    QuotedIdentifier,
    /// Inside a `--` or `/* */` comment
    Comment,
}

/// One unit produced by the scanner
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A single character and its lexical class
    Char { class: CharClass, ch: char },
    /// A batch delimiter; its characters are consumed
    Delimiter,
    /// A custom statement: the original text and the value it carries
    Custom { text: String, value: String },
}

impl Token {
    fn char(class: CharClass, ch: char) -> Self {
        Token::Char { class, ch }
    }
}

/// Marker separating independently executable batches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchDelimiter {
    marker: String,
    requires_whitespace: bool,
}

impl BatchDelimiter {
    /// Create a delimiter.
    ///
    /// With `requires_whitespace` the marker only counts when it stands alone
    /// on its line (surrounded by nothing but whitespace). Without it, the
    /// marker splits wherever it appears in code.
    pub fn new(marker: impl Into<String>, requires_whitespace: bool) -> SqlResult<Self> {
        let marker = marker.into();
        if marker.trim().is_empty() {
            return Err(SqlError::InvalidDelimiter(
                "batch delimiter marker cannot be empty".to_string(),
            ));
        }
        Ok(Self {
            marker,
            requires_whitespace,
        })
    }

    /// Delimiter marker text
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Whether the marker must stand alone on its line
    pub fn requires_whitespace(&self) -> bool {
        self.requires_whitespace
    }
}

impl Default for BatchDelimiter {
    fn default() -> Self {
        Self {
            marker: "GO".to_string(),
            requires_whitespace: true,
        }
    }
}

/// Quoting conventions of the target store's SQL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteRules {
    /// `[...]` quotes an identifier, as in T-SQL. Stores that use brackets
    /// for lists or subscripts leave this off.
    pub bracket_identifiers: bool,
}

impl Default for QuoteRules {
    fn default() -> Self {
        Self {
            bracket_identifiers: true,
        }
    }
}

/// A custom statement recognised by the scanner in code context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomMatch {
    /// Number of characters the statement spans
    pub len: usize,
    /// Value extracted from the statement
    pub value: String,
}

/// Hook for recognising custom statements
pub trait CustomStatement {
    /// Recognise a statement starting at `input[0]`
    fn recognize(&self, input: &[char]) -> Option<CustomMatch>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexState {
    Code,
    SingleQuote,
    DoubleQuote,
    Bracket,
    LineComment,
    BlockComment,
}

/// Pull-style scanner over script text
pub struct Scanner<'a> {
    chars: Vec<char>,
    pos: usize,
    state: LexState,
    at_line_start: bool,
    delimiter: Option<(Vec<char>, bool)>,
    custom: Option<&'a dyn CustomStatement>,
    rules: QuoteRules,
    pending: VecDeque<Token>,
}

impl<'a> Scanner<'a> {
    /// Scan `text` with no delimiter and no custom statements
    pub fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            state: LexState::Code,
            at_line_start: true,
            delimiter: None,
            custom: None,
            rules: QuoteRules::default(),
            pending: VecDeque::new(),
        }
    }

    /// Recognise `delimiter` as a batch boundary
    pub fn with_delimiter(mut self, delimiter: &BatchDelimiter) -> Self {
        self.delimiter = Some((
            delimiter.marker.chars().collect(),
            delimiter.requires_whitespace,
        ));
        self
    }

    /// Recognise custom statements with `hook`
    pub fn with_custom(mut self, hook: &'a dyn CustomStatement) -> Self {
        self.custom = Some(hook);
        self
    }

    /// Follow `rules` for quoted regions
    pub fn with_quote_rules(mut self, rules: QuoteRules) -> Self {
        self.rules = rules;
        self
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn delimiter_len(&self) -> Option<usize> {
        let (marker, requires_whitespace) = self.delimiter.as_ref()?;
        let end = self.pos + marker.len();
        if end > self.chars.len() {
            return None;
        }

        let matches = self.chars[self.pos..end]
            .iter()
            .zip(marker)
            .all(|(a, b)| a.to_lowercase().eq(b.to_lowercase()));
        if !matches {
            return None;
        }

        if !requires_whitespace {
            return Some(marker.len());
        }

        let rest_of_line_blank = self.chars[end..]
            .iter()
            .take_while(|c| **c != '\n')
            .all(|c| c.is_whitespace());

        (self.at_line_start && rest_of_line_blank).then_some(marker.len())
    }

    fn scan_code(&mut self, ch: char) -> Token {
        if let Some(len) = self.delimiter_len() {
            self.pos += len;
            self.at_line_start = false;
            return Token::Delimiter;
        }

        if let Some(hook) = self.custom {
            if let Some(found) = hook.recognize(&self.chars[self.pos..]) {
                let end = (self.pos + found.len).min(self.chars.len());
                let text = self.chars[self.pos..end].iter().collect();
                self.pos = end;
                self.at_line_start = false;
                return Token::Custom {
                    text,
                    value: found.value,
                };
            }
        }

        let next = self.peek(1);
        self.pos += 1;

        match ch {
            '\'' => self.enter(LexState::SingleQuote, CharClass::QuotedString, ch),
            '"' => self.enter(LexState::DoubleQuote, CharClass::QuotedIdentifier, ch),
            '[' if self.rules.bracket_identifiers => {
                self.enter(LexState::Bracket, CharClass::QuotedIdentifier, ch)
            }
            '-' if next == Some('-') => self.enter(LexState::LineComment, CharClass::Comment, ch),
            '/' if next == Some('*') => {
                // consume the '*' now so "/*/" does not close the comment
                self.pos += 1;
                self.pending.push_back(Token::char(CharClass::Comment, '*'));
                self.enter(LexState::BlockComment, CharClass::Comment, ch)
            }
            '\n' => {
                self.at_line_start = true;
                Token::char(CharClass::Whitespace, ch)
            }
            c if c.is_whitespace() => Token::char(CharClass::Whitespace, c),
            c => {
                self.at_line_start = false;
                Token::char(CharClass::Code, c)
            }
        }
    }

    fn enter(&mut self, state: LexState, class: CharClass, ch: char) -> Token {
        self.state = state;
        self.at_line_start = false;
        Token::char(class, ch)
    }

    /// Inside a quoted region closed by `close`, where a doubled `close`
    /// is an escaped literal character.
    fn scan_quoted(&mut self, ch: char, close: char, class: CharClass) -> Token {
        self.pos += 1;
        if ch == close {
            if self.peek(0) == Some(close) {
                self.pos += 1;
                self.pending.push_back(Token::char(class, close));
            } else {
                self.state = LexState::Code;
            }
        }
        Token::char(class, ch)
    }

    fn scan_line_comment(&mut self, ch: char) -> Token {
        self.pos += 1;
        if ch == '\n' {
            self.state = LexState::Code;
            self.at_line_start = true;
            return Token::char(CharClass::Whitespace, ch);
        }
        Token::char(CharClass::Comment, ch)
    }

    fn scan_block_comment(&mut self, ch: char) -> Token {
        self.pos += 1;
        if ch == '*' && self.peek(0) == Some('/') {
            self.pos += 1;
            self.pending.push_back(Token::char(CharClass::Comment, '/'));
            self.state = LexState::Code;
        }
        Token::char(CharClass::Comment, ch)
    }
}

impl Iterator for Scanner<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if let Some(token) = self.pending.pop_front() {
            return Some(token);
        }

        let ch = self.peek(0)?;
        let token = match self.state {
            LexState::Code => self.scan_code(ch),
            LexState::SingleQuote => self.scan_quoted(ch, '\'', CharClass::QuotedString),
            LexState::DoubleQuote => self.scan_quoted(ch, '"', CharClass::QuotedIdentifier),
            LexState::Bracket => self.scan_quoted(ch, ']', CharClass::QuotedIdentifier),
            LexState::LineComment => self.scan_line_comment(ch),
            LexState::BlockComment => self.scan_block_comment(ch),
        };
        Some(token)
    }
}

#[cfg(test)]
#[path = "scanner_test.rs"]
mod tests;
