//! Step-pattern lexing and compilation helpers.

mod compiler;
pub(crate) mod lexer;
mod placeholder;

use crate::errors::PatternError;
use lexer::{Token, lex_pattern};
use regex::Regex;

pub use compiler::build_regex_from_pattern;

/// Build and compile a regular expression from a step pattern.
///
/// # Errors
/// Returns [`PatternError`] when placeholder parsing fails or the generated
/// regex source cannot be compiled.
pub fn compile_regex_from_pattern(pat: &str) -> Result<Regex, PatternError> {
    let source = build_regex_from_pattern(pat)?;
    Regex::new(&source).map_err(PatternError::from)
}

/// Return the unescaped text of a pattern that has no placeholders.
///
/// `None` means the pattern is parameterized and cannot match by plain string
/// equality.
///
/// # Errors
/// Returns [`PatternError`] when a placeholder is malformed.
///
/// # Examples
/// ```
/// use pickle_bdd_patterns::literal_text;
/// assert_eq!(
///     literal_text("a {{literal}} step").expect("valid pattern").as_deref(),
///     Some("a {literal} step")
/// );
/// assert_eq!(literal_text("a {value} step").expect("valid pattern"), None);
/// ```
pub fn literal_text(pat: &str) -> Result<Option<String>, PatternError> {
    let mut text = String::with_capacity(pat.len());
    for token in lex_pattern(pat)? {
        match token {
            Token::Literal(part) => text.push_str(&part),
            Token::OpenBrace { .. } => text.push('{'),
            Token::CloseBrace { .. } => text.push('}'),
            Token::Placeholder { .. } => return Ok(None),
        }
    }
    Ok(Some(text))
}

/// List the placeholder names of a pattern in declaration order.
///
/// # Errors
/// Returns [`PatternError`] when a placeholder is malformed.
pub fn placeholder_names(pat: &str) -> Result<Vec<String>, PatternError> {
    Ok(lex_pattern(pat)?
        .into_iter()
        .filter_map(|token| match token {
            Token::Placeholder { name, .. } => Some(name),
            _ => None,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Display;

    fn expect_ok<T, E: Display>(result: Result<T, E>, context: &str) -> T {
        match result {
            Ok(value) => value,
            Err(err) => panic!("{context}: {err}"),
        }
    }

    #[test]
    fn compiles_regex_from_pattern_successfully() {
        let regex = expect_ok(
            compile_regex_from_pattern("Given {value}"),
            "pattern should compile",
        );
        assert_eq!(regex.as_str(), "^Given (?P<value>.+?)$");
    }

    #[test]
    fn surfaces_regex_compilation_errors() {
        let heavy: String = (0..20_000).map(|i| format!("{{v{i}:f64}}")).collect();
        let Err(err) = compile_regex_from_pattern(&format!("prefix {heavy}")) else {
            panic!("pattern should be too large");
        };
        assert!(matches!(
            err,
            PatternError::Regex(regex::Error::CompiledTooBig(_))
        ));
    }

    #[test]
    fn lists_placeholder_names() {
        let names = expect_ok(
            placeholder_names("{a} then {b:u8} and {{c}}"),
            "pattern should lex",
        );
        assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn literal_text_keeps_stray_braces() {
        let text = expect_ok(literal_text("{ odd }"), "pattern should lex");
        assert_eq!(text.as_deref(), Some("{ odd }"));
    }
}
