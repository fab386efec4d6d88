//! Compiled step patterns.
//!
//! A pattern is either placeholder text such as `I have {count:u32} apples`
//! or a raw regular expression. Both compile eagerly so malformed patterns
//! fail at registration rather than mid-run.

use std::fmt;
use std::hash::{Hash, Hasher};

use pickle_bdd_patterns::{
    PatternError, SpecificityScore, compile_regex_from_pattern, extract_named_values,
    literal_text,
};
use regex::Regex;
use thiserror::Error;

use crate::StepArgs;

/// Errors that may occur when compiling a [`StepPattern`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StepPatternError {
    /// Placeholder syntax in the pattern is invalid.
    #[error(transparent)]
    Placeholder(#[from] PatternError),
    /// A raw regular expression failed to compile.
    #[error("invalid regular expression: {0}")]
    InvalidRegex(#[source] regex::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum PatternKind {
    Placeholders,
    Regex,
}

/// A step pattern compiled for matching.
///
/// Two patterns are equal when they were written the same way; the compiled
/// regex is derived data.
///
/// # Examples
/// ```
/// use pickle_bdd::StepPattern;
///
/// let pattern = StepPattern::new("I have {count:u32} apples").expect("valid pattern");
/// let args = pattern.captures("I have 3 apples").expect("text matches");
/// assert_eq!(args.get("count"), Some("3"));
/// assert!(pattern.captures("I have some apples").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct StepPattern {
    text: String,
    kind: PatternKind,
    regex: Regex,
    literal: Option<String>,
    specificity: Option<SpecificityScore>,
}

impl StepPattern {
    /// Compile placeholder pattern text.
    ///
    /// # Errors
    /// Returns [`StepPatternError::Placeholder`] for malformed placeholders or
    /// braces, including unnamed `{}` and positional `{0}` placeholders.
    pub fn new(text: &str) -> Result<Self, StepPatternError> {
        let regex = compile_regex_from_pattern(text)?;
        let literal = literal_text(text)?;
        let specificity = SpecificityScore::calculate(text)?;
        Ok(Self {
            text: text.to_string(),
            kind: PatternKind::Placeholders,
            regex,
            literal,
            specificity: Some(specificity),
        })
    }

    /// Compile a raw regular expression.
    ///
    /// The expression must match the whole step text. Only named groups become
    /// step arguments.
    ///
    /// # Errors
    /// Returns [`StepPatternError::InvalidRegex`] when the expression does not
    /// compile.
    ///
    /// # Examples
    /// ```
    /// use pickle_bdd::StepPattern;
    ///
    /// let pattern = StepPattern::regex(r"(?P<n>\d+) (?:red|blue) balls").expect("valid regex");
    /// let args = pattern.captures("4 red balls").expect("text matches");
    /// assert_eq!(args.get("n"), Some("4"));
    /// assert!(pattern.captures("4 red balls today").is_none());
    /// ```
    pub fn regex(source: &str) -> Result<Self, StepPatternError> {
        let regex =
            Regex::new(&format!("^(?:{source})$")).map_err(StepPatternError::InvalidRegex)?;
        Ok(Self {
            text: source.to_string(),
            kind: PatternKind::Regex,
            regex,
            literal: None,
            specificity: None,
        })
    }

    /// Pattern text as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Whether this is a raw regular expression.
    #[must_use]
    pub fn is_regex(&self) -> bool {
        self.kind == PatternKind::Regex
    }

    /// Unescaped text of a placeholder-free pattern.
    #[must_use]
    pub fn literal(&self) -> Option<&str> {
        self.literal.as_deref()
    }

    /// Whether `text` equals this pattern's literal text.
    #[must_use]
    pub fn matches_exactly(&self, text: &str) -> bool {
        self.literal.as_deref() == Some(text)
    }

    /// Ranking used when several parameterized patterns match.
    ///
    /// Raw regular expressions have no score: their literal content is not
    /// known, so they rank level with every other candidate.
    #[must_use]
    pub fn specificity(&self) -> Option<SpecificityScore> {
        self.specificity
    }

    /// Match `text`, returning the captured arguments.
    #[must_use]
    pub fn captures(&self, text: &str) -> Option<StepArgs> {
        if let Some(literal) = self.literal.as_deref() {
            return (literal == text).then(StepArgs::default);
        }
        extract_named_values(&self.regex, text).map(StepArgs::from)
    }
}

impl PartialEq for StepPattern {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.text == other.text
    }
}

impl Eq for StepPattern {}

impl Hash for StepPattern {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.text.hash(state);
    }
}

impl fmt::Display for StepPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
