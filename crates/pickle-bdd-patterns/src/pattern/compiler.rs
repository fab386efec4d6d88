//! Convert lexed tokens into anchored regular-expression sources.

use crate::errors::{PatternError, PlaceholderFault, placeholder_error};
use crate::hint::get_type_pattern;

use super::lexer::{Token, lex_pattern};

/// Build an anchored regular expression from a step pattern.
///
/// Each placeholder becomes a capture group named after it.
///
/// # Errors
/// Returns [`PatternError`] when the pattern holds malformed or repeated
/// placeholders, or unbalanced braces.
///
/// # Examples
/// ```
/// # use pickle_bdd_patterns::build_regex_from_pattern;
/// let regex = build_regex_from_pattern("I have {count:u32} cukes")
///     .expect("example ensures fallible call succeeds");
/// assert_eq!(regex, r"^I have (?P<count>\d+) cukes$");
/// ```
pub fn build_regex_from_pattern(pat: &str) -> Result<String, PatternError> {
    let tokens = lex_pattern(pat)?;
    let mut regex = String::with_capacity(pat.len().saturating_mul(2) + 2);
    regex.push('^');
    let mut stray_depth = 0usize;
    let mut seen: Vec<String> = Vec::new();

    for token in tokens {
        match token {
            Token::Literal(text) => regex.push_str(&regex::escape(&text)),
            Token::Placeholder { start, name, hint } => {
                if seen.contains(&name) {
                    return Err(placeholder_error(
                        PlaceholderFault::Duplicate,
                        start,
                        Some(name),
                    ));
                }
                regex.push_str("(?P<");
                regex.push_str(&name);
                regex.push('>');
                regex.push_str(get_type_pattern(hint.as_deref()));
                regex.push(')');
                seen.push(name);
            }
            Token::OpenBrace { .. } => {
                stray_depth = stray_depth.saturating_add(1);
                regex.push_str(&regex::escape("{"));
            }
            Token::CloseBrace { index } => {
                if stray_depth == 0 {
                    return Err(placeholder_error(
                        PlaceholderFault::UnmatchedClose,
                        index,
                        None,
                    ));
                }
                stray_depth -= 1;
                regex.push_str(&regex::escape("}"));
            }
        }
    }

    if stray_depth != 0 {
        return Err(placeholder_error(PlaceholderFault::Unbalanced, pat.len(), None));
    }

    regex.push('$');
    Ok(regex)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_groups_after_placeholders() {
        let regex = build_regex_from_pattern("{user} owns {count:d} {item}")
            .unwrap_or_else(|err| panic!("pattern should compile: {err}"));
        assert_eq!(
            regex,
            r"^(?P<user>.+?) owns (?P<count>[+-]?\d+) (?P<item>.+?)$"
        );
    }

    #[test]
    fn escapes_regex_metacharacters_in_literals() {
        let regex = build_regex_from_pattern("costs $5 (approx.)")
            .unwrap_or_else(|err| panic!("pattern should compile: {err}"));
        assert_eq!(regex, r"^costs \$5 \(approx\.\)$");
    }

    #[test]
    fn errors_when_closing_brace_unmatched() {
        let Err(err) = build_regex_from_pattern("broken}") else {
            panic!("should fail");
        };
        assert_eq!(err.fault(), Some(PlaceholderFault::UnmatchedClose));
    }

    #[test]
    fn errors_when_open_braces_remain() {
        let Err(err) = build_regex_from_pattern("broken {") else {
            panic!("should fail");
        };
        assert_eq!(err.fault(), Some(PlaceholderFault::Unbalanced));
    }

    #[test]
    fn rejects_repeated_placeholder_names() {
        let Err(err) = build_regex_from_pattern("{x} plus {x}") else {
            panic!("should fail");
        };
        assert_eq!(
            err.to_string(),
            "duplicate placeholder name in step pattern for placeholder `x` at byte 9 (zero-based)"
        );
    }
}
