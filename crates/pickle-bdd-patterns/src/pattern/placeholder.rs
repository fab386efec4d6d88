//! Placeholder parsing used by the lexer.

use crate::errors::{PatternError, PlaceholderFault, placeholder_error};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PlaceholderSpec {
    pub name: String,
    pub hint: Option<String>,
    pub start: usize,
}

/// Parse the placeholder opening at `chars[index]`.
///
/// `chars` holds the pattern's `char_indices`; the returned index points just
/// past the closing brace. Only `:` or `}` may follow the name.
pub(crate) fn parse_placeholder(
    chars: &[(usize, char)],
    index: usize,
) -> Result<(usize, PlaceholderSpec), PatternError> {
    let start = chars.get(index).map_or(0, |&(offset, _)| offset);
    let mut pos = index + 1;
    let mut name = String::new();
    while let Some(&(_, ch)) = chars.get(pos) {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            name.push(ch);
            pos += 1;
        } else {
            break;
        }
    }

    let hint = match chars.get(pos).map(|&(_, ch)| ch) {
        Some('}') => None,
        Some(':') => {
            pos += 1;
            let mut raw = String::new();
            while let Some(&(_, ch)) = chars.get(pos) {
                if ch == '}' {
                    break;
                }
                raw.push(ch);
                pos += 1;
            }
            if chars.get(pos).is_none() {
                return Err(placeholder_error(PlaceholderFault::Unclosed, start, Some(name)));
            }
            if raw.is_empty() || raw.chars().any(|c| c.is_whitespace() || c == '{') {
                return Err(placeholder_error(PlaceholderFault::Invalid, start, Some(name)));
            }
            Some(raw)
        }
        Some(_) => return Err(placeholder_error(PlaceholderFault::Invalid, start, Some(name))),
        None => return Err(placeholder_error(PlaceholderFault::Unclosed, start, Some(name))),
    };

    Ok((pos + 1, PlaceholderSpec { name, hint, start }))
}
