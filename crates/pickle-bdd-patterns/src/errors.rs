//! Error types raised while lexing and compiling step patterns.

use std::fmt;
use thiserror::Error;

/// The ways a placeholder or brace can be malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum PlaceholderFault {
    /// A placeholder name or hint is not well formed.
    Invalid,
    /// A placeholder opened with `{` never closes.
    Unclosed,
    /// The same name is used by two placeholders.
    Duplicate,
    /// A `}` appears without a matching `{`.
    UnmatchedClose,
    /// A stray `{` is still open at the end of the pattern.
    Unbalanced,
}

impl PlaceholderFault {
    /// Human-readable description used in error messages.
    #[must_use]
    pub fn describe(self) -> &'static str {
        match self {
            Self::Invalid => "invalid placeholder in step pattern",
            Self::Unclosed => "missing closing '}' for placeholder",
            Self::Duplicate => "duplicate placeholder name in step pattern",
            Self::UnmatchedClose => "unmatched closing brace '}' in step pattern",
            Self::Unbalanced => "unbalanced braces in step pattern",
        }
    }
}

/// Where and why a placeholder failed to parse.
///
/// # Examples
/// ```
/// use pickle_bdd_patterns::{PlaceholderErrorInfo, PlaceholderFault};
///
/// let info = PlaceholderErrorInfo::new(PlaceholderFault::Duplicate, 9, Some("x".into()));
/// assert_eq!(
///     info.to_string(),
///     "duplicate placeholder name in step pattern for placeholder `x` at byte 9 (zero-based)"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderErrorInfo {
    /// Kind of failure.
    pub fault: PlaceholderFault,
    /// Zero-based byte offset into the pattern.
    pub position: usize,
    /// Placeholder name, when one had been read.
    pub placeholder: Option<String>,
}

impl PlaceholderErrorInfo {
    /// Describe a failure at `position`.
    #[must_use]
    pub fn new(fault: PlaceholderFault, position: usize, placeholder: Option<String>) -> Self {
        Self {
            fault,
            position,
            placeholder,
        }
    }
}

impl fmt::Display for PlaceholderErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.fault.describe())?;
        if let Some(name) = &self.placeholder {
            write!(f, " for placeholder `{name}`")?;
        }
        write!(f, " at byte {} (zero-based)", self.position)
    }
}

/// Errors surfaced while turning step patterns into regular expressions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PatternError {
    /// A placeholder or brace in the pattern is malformed.
    #[error("{0}")]
    Placeholder(PlaceholderErrorInfo),
    /// The generated regular expression failed to compile.
    #[error(transparent)]
    Regex(#[from] regex::Error),
}

impl PatternError {
    /// Kind of placeholder failure, if this is one.
    #[must_use]
    pub fn fault(&self) -> Option<PlaceholderFault> {
        match self {
            Self::Placeholder(info) => Some(info.fault),
            Self::Regex(_) => None,
        }
    }
}

pub(crate) fn placeholder_error(
    fault: PlaceholderFault,
    position: usize,
    placeholder: Option<String>,
) -> PatternError {
    PatternError::Placeholder(PlaceholderErrorInfo::new(fault, position, placeholder))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Some("count"), " for placeholder `count` at byte 4 (zero-based)")]
    #[case(None, " at byte 4 (zero-based)")]
    fn renders_position_and_name(#[case] name: Option<&str>, #[case] suffix: &str) {
        let info = PlaceholderErrorInfo::new(PlaceholderFault::Invalid, 4, name.map(Into::into));
        let expected = format!("invalid placeholder in step pattern{suffix}");
        assert_eq!(info.to_string(), expected);
    }

    #[test]
    fn regex_errors_carry_no_fault() {
        let err = PatternError::from(regex::Error::Syntax("bad".into()));
        assert_eq!(err.fault(), None);
        assert_eq!(err.to_string(), "bad");
    }
}
