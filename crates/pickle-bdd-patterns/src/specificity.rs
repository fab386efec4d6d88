//! Pattern specificity used to rank competing parameterized matches.

use crate::PatternError;
use crate::pattern::lexer::{Token, lex_pattern};
use std::cmp::Ordering;

/// Specificity score for a step pattern.
///
/// Higher scores indicate more specific patterns that should take precedence.
///
/// # Ordering
///
/// Patterns are compared by:
/// 1. More literal characters → more specific
/// 2. Fewer placeholders → more specific
/// 3. More typed placeholders → more specific (tiebreaker)
///
/// # Examples
///
/// ```
/// use pickle_bdd_patterns::SpecificityScore;
///
/// let specific = SpecificityScore::calculate("the output is {value} bytes")
///     .expect("valid specific pattern");
/// let generic = SpecificityScore::calculate("the output is {value}")
///     .expect("valid generic pattern");
/// assert!(specific > generic);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SpecificityScore {
    /// Total number of literal characters in the pattern.
    pub literal_chars: usize,
    /// Number of placeholder tokens in the pattern.
    pub placeholder_count: usize,
    /// Number of placeholders with type hints (e.g., `{n:u32}`).
    pub typed_placeholder_count: usize,
}

impl SpecificityScore {
    /// Calculate the specificity score for a pattern string.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`] if the pattern contains invalid syntax.
    ///
    /// # Examples
    ///
    /// ```
    /// use pickle_bdd_patterns::SpecificityScore;
    ///
    /// let score = SpecificityScore::calculate("I have {count:u32} apples")
    ///     .expect("valid pattern");
    /// assert_eq!(score.literal_chars, 14);
    /// assert_eq!(score.placeholder_count, 1);
    /// assert_eq!(score.typed_placeholder_count, 1);
    /// ```
    pub fn calculate(pattern: &str) -> Result<Self, PatternError> {
        let mut score = Self::default();
        for token in lex_pattern(pattern)? {
            match token {
                Token::Literal(text) => score.literal_chars += text.chars().count(),
                Token::Placeholder { hint, .. } => {
                    score.placeholder_count += 1;
                    if hint.is_some() {
                        score.typed_placeholder_count += 1;
                    }
                }
                Token::OpenBrace { .. } | Token::CloseBrace { .. } => score.literal_chars += 1,
            }
        }
        Ok(score)
    }
}

impl Ord for SpecificityScore {
    fn cmp(&self, other: &Self) -> Ordering {
        self.literal_chars
            .cmp(&other.literal_chars)
            .then_with(|| other.placeholder_count.cmp(&self.placeholder_count))
            .then_with(|| {
                self.typed_placeholder_count
                    .cmp(&other.typed_placeholder_count)
            })
    }
}

impl PartialOrd for SpecificityScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
