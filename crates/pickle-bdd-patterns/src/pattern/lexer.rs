//! Pattern lexer converting pattern strings into semantic tokens.

use crate::errors::{PatternError, PlaceholderFault, placeholder_error};

use super::placeholder::parse_placeholder;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Literal(String),
    Placeholder {
        start: usize,
        name: String,
        hint: Option<String>,
    },
    OpenBrace {
        index: usize,
    },
    CloseBrace {
        index: usize,
    },
}

fn flush_literal(literal: &mut String, tokens: &mut Vec<Token>) {
    if !literal.is_empty() {
        tokens.push(Token::Literal(std::mem::take(literal)));
    }
}

/// Split `pattern` into literal runs, placeholders and stray braces.
///
/// Positions are byte offsets into `pattern`. Anonymous `{}` and positional
/// `{0}` placeholders are rejected since their values could not be named.
pub(crate) fn lex_pattern(pattern: &str) -> Result<Vec<Token>, PatternError> {
    let chars: Vec<(usize, char)> = pattern.char_indices().collect();
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut pos = 0;

    while let Some(&(offset, ch)) = chars.get(pos) {
        let next = chars.get(pos + 1).map(|&(_, c)| c);
        match (ch, next) {
            ('\\', Some(escaped)) => {
                literal.push(escaped);
                pos += 2;
            }
            ('{', Some('{')) => {
                literal.push('{');
                pos += 2;
            }
            ('{', Some(c)) if c.is_ascii_alphabetic() || c == '_' => {
                flush_literal(&mut literal, &mut tokens);
                let (next_pos, spec) = parse_placeholder(&chars, pos)?;
                tokens.push(Token::Placeholder {
                    start: spec.start,
                    name: spec.name,
                    hint: spec.hint,
                });
                pos = next_pos;
            }
            ('{', Some(c)) if c == '}' || c.is_ascii_digit() => {
                return Err(placeholder_error(PlaceholderFault::Invalid, offset, None));
            }
            ('{', _) => {
                flush_literal(&mut literal, &mut tokens);
                tokens.push(Token::OpenBrace { index: offset });
                pos += 1;
            }
            ('}', Some('}')) => {
                literal.push('}');
                pos += 2;
            }
            ('}', _) => {
                flush_literal(&mut literal, &mut tokens);
                tokens.push(Token::CloseBrace { index: offset });
                pos += 1;
            }
            _ => {
                literal.push(ch);
                pos += 1;
            }
        }
    }

    flush_literal(&mut literal, &mut tokens);
    Ok(tokens)
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests exercise lexing fallibility")]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::anonymous("a {} b", 2)]
    #[case::positional("a {0} b", 2)]
    #[case::positional_with_hint("{1:d} items", 0)]
    fn rejects_unnamed_placeholders(#[case] pattern: &str, #[case] position: usize) {
        let Err(PatternError::Placeholder(info)) = lex_pattern(pattern) else {
            panic!("{pattern:?} should be rejected");
        };
        assert_eq!(info.fault, PlaceholderFault::Invalid);
        assert_eq!(info.position, position);
        assert_eq!(info.placeholder, None);
    }

    #[test]
    fn tokenises_literals_and_placeholders() {
        let tokens = lex_pattern("Given {value:u32}").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Literal("Given ".into()),
                Token::Placeholder {
                    start: 6,
                    name: "value".into(),
                    hint: Some("u32".into()),
                },
            ]
        );
    }

    #[test]
    fn recognises_doubled_braces_as_literals() {
        let tokens = lex_pattern("{{outer}} {inner}").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Literal("{outer} ".into()),
                Token::Placeholder {
                    start: 10,
                    name: "inner".into(),
                    hint: None,
                },
            ]
        );
    }

    #[test]
    fn records_stray_braces() {
        let tokens = lex_pattern("{ literal }").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::OpenBrace { index: 0 },
                Token::Literal(" literal ".into()),
                Token::CloseBrace { index: 10 },
            ]
        );
    }

    #[test]
    fn backslash_escapes_next_character() {
        let tokens = lex_pattern(r"cost \{price\} now").unwrap();
        assert_eq!(tokens, vec![Token::Literal("cost {price} now".into())]);
    }

    #[test]
    fn offsets_are_bytes_after_multibyte_text() {
        let tokens = lex_pattern("café {name}").unwrap();
        assert_eq!(
            tokens.get(1),
            Some(&Token::Placeholder {
                start: 6,
                name: "name".into(),
                hint: None,
            })
        );
    }
}
