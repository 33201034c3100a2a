use super::*;

fn classes(text: &str) -> Vec<(char, CharClass)> {
    Scanner::new(text)
        .filter_map(|t| match t {
            Token::Char { class, ch } => Some((ch, class)),
            _ => None,
        })
        .collect()
}

fn class_of(text: &str, needle: char) -> CharClass {
    classes(text)
        .into_iter()
        .find(|(c, _)| *c == needle)
        .map(|(_, class)| class)
        .unwrap()
}

fn delimiter_count(text: &str, delimiter: &BatchDelimiter) -> usize {
    Scanner::new(text)
        .with_delimiter(delimiter)
        .filter(|t| *t == Token::Delimiter)
        .count()
}

#[test]
fn test_every_character_is_echoed() {
    let text = "SELECT 'a''b', \"c\" -- note\n/* block */ [x]";
    let echoed: String = classes(text).into_iter().map(|(c, _)| c).collect();
    assert_eq!(echoed, text);
}

#[test]
fn test_classifies_code_and_whitespace() {
    let scanned = classes("a b");
    assert_eq!(
        scanned,
        vec![
            ('a', CharClass::Code),
            (' ', CharClass::Whitespace),
            ('b', CharClass::Code),
        ]
    );
}

#[test]
fn test_string_literal_with_doubled_quote() {
    let scanned = classes("'it''s' x");
    let literal: Vec<CharClass> = scanned.iter().take(7).map(|(_, c)| *c).collect();
    assert!(literal.iter().all(|c| *c == CharClass::QuotedString));
    assert_eq!(scanned[8], ('x', CharClass::Code));
}

#[test]
fn test_quoted_identifiers() {
    assert_eq!(class_of("\"my id\"", 'y'), CharClass::QuotedIdentifier);
    assert_eq!(class_of("[my]]id] z", 'i'), CharClass::QuotedIdentifier);
    assert_eq!(class_of("[my]]id] z", 'z'), CharClass::Code);
}

#[test]
fn test_line_comment_ends_at_newline() {
    let scanned = classes("-- hi\nx");
    assert_eq!(scanned[3], ('h', CharClass::Comment));
    assert_eq!(scanned[5], ('\n', CharClass::Whitespace));
    assert_eq!(scanned[6], ('x', CharClass::Code));
}

#[test]
fn test_block_comment_does_not_nest() {
    let scanned = classes("/* a /* b */ c");
    let c = scanned.iter().find(|(ch, _)| *ch == 'c').unwrap();
    assert_eq!(c.1, CharClass::Code);
}

#[test]
fn test_block_comment_opening_star_is_not_closing() {
    // "/*/" is still inside the comment
    assert_eq!(class_of("/*/ x */", 'x'), CharClass::Comment);
}

#[test]
fn test_unterminated_literal_runs_to_end() {
    let scanned = classes("'never closed\nGO\n");
    assert!(scanned.iter().all(|(_, c)| *c == CharClass::QuotedString));
    assert_eq!(delimiter_count("'never closed\nGO\n", &BatchDelimiter::default()), 0);
}

#[test]
fn test_delimiter_on_own_line() {
    let go = BatchDelimiter::default();
    assert_eq!(delimiter_count("SELECT 1\nGO\nSELECT 2", &go), 1);
    assert_eq!(delimiter_count("SELECT 1\n  go  \nSELECT 2\nGO", &go), 2);
}

#[test]
fn test_delimiter_must_stand_alone() {
    let go = BatchDelimiter::default();
    assert_eq!(delimiter_count("SELECT 1 GO", &go), 0);
    assert_eq!(delimiter_count("GOTO label", &go), 0);
    assert_eq!(delimiter_count("GO 5", &go), 0);
    assert_eq!(delimiter_count("SELECT GOAL FROM t", &go), 0);
}

#[test]
fn test_delimiter_ignored_in_literal_and_comments() {
    let go = BatchDelimiter::default();
    assert_eq!(delimiter_count("SELECT '\nGO\n'", &go), 0);
    assert_eq!(delimiter_count("/*\nGO\n*/", &go), 0);
    assert_eq!(delimiter_count("-- GO\nSELECT 1", &go), 0);
}

#[test]
fn test_delimiter_after_line_comment() {
    let go = BatchDelimiter::default();
    assert_eq!(delimiter_count("SELECT 1 -- first\nGO\n", &go), 1);
}

#[test]
fn test_delimiter_without_whitespace_requirement() {
    let semi = BatchDelimiter::new(";", false).unwrap();
    assert_eq!(delimiter_count("SELECT 1;SELECT 2; SELECT ';'", &semi), 2);
}

#[test]
fn test_empty_delimiter_rejected() {
    assert!(matches!(
        BatchDelimiter::new("  ", true),
        Err(SqlError::InvalidDelimiter(_))
    ));
}

struct AtSign;

impl CustomStatement for AtSign {
    fn recognize(&self, input: &[char]) -> Option<CustomMatch> {
        if input.first() != Some(&'@') {
            return None;
        }
        let len = 1 + input[1..].iter().take_while(|c| c.is_alphabetic()).count();
        Some(CustomMatch {
            len,
            value: input[1..len].iter().collect(),
        })
    }
}

#[test]
fn test_custom_statement_only_in_code() {
    let hook = AtSign;
    let customs: Vec<String> = Scanner::new("@one '@two' -- @three\n@four")
        .with_custom(&hook)
        .filter_map(|t| match t {
            Token::Custom { value, .. } => Some(value),
            _ => None,
        })
        .collect();
    assert_eq!(customs, vec!["one", "four"]);
}

#[test]
fn test_custom_statement_keeps_original_text() {
    let hook = AtSign;
    let token = Scanner::new("@name").with_custom(&hook).next().unwrap();
    assert_eq!(
        token,
        Token::Custom {
            text: "@name".to_string(),
            value: "name".to_string()
        }
    );
}
