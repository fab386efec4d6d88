//! Step keywords and the effective-type rule for conjunctions.

use std::fmt;
use std::str::FromStr;

use gherkin::StepType;
use thiserror::Error;

/// Keyword introducing a step.
///
/// Only `Given`, `When` and `Then` carry meaning of their own. `And`, `But`
/// and the bullet `*` are conjunctions that inherit the effective keyword of
/// the nearest preceding primary step; see [`resolve`](Self::resolve).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKeyword {
    /// Setup preconditions for a scenario.
    Given,
    /// Perform an action when testing behaviour.
    When,
    /// Assert the expected outcome of a scenario.
    Then,
    /// Additional conditions that share context with the previous step.
    And,
    /// Negative or contrasting conditions.
    But,
}

impl StepKeyword {
    /// Return the keyword as a string slice.
    ///
    /// # Examples
    ///
    /// ```
    /// use pickle_bdd_patterns::StepKeyword;
    ///
    /// assert_eq!(StepKeyword::Given.as_str(), "Given");
    /// assert_eq!(StepKeyword::But.as_str(), "But");
    /// ```
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Given => "Given",
            Self::When => "When",
            Self::Then => "Then",
            Self::And => "And",
            Self::But => "But",
        }
    }

    /// Whether the keyword inherits its meaning from a previous step.
    #[must_use]
    pub const fn is_conjunction(self) -> bool {
        matches!(self, Self::And | Self::But)
    }

    /// Compute the effective keyword of a step.
    ///
    /// Conjunctions take `prev`, the effective keyword of the preceding step,
    /// falling back to `Given` for a leading conjunction. Primary keywords are
    /// returned unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use pickle_bdd_patterns::StepKeyword;
    ///
    /// assert_eq!(StepKeyword::And.resolve(Some(StepKeyword::When)), StepKeyword::When);
    /// assert_eq!(StepKeyword::But.resolve(None), StepKeyword::Given);
    /// assert_eq!(StepKeyword::Then.resolve(Some(StepKeyword::Given)), StepKeyword::Then);
    /// ```
    #[must_use]
    pub fn resolve(self, prev: Option<Self>) -> Self {
        if self.is_conjunction() {
            prev.filter(|kw| !kw.is_conjunction())
                .unwrap_or(Self::Given)
        } else {
            self
        }
    }
}

impl fmt::Display for StepKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keyword text that names no step type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid step keyword: {0}")]
pub struct StepKeywordParseError(pub String);

impl FromStr for StepKeyword {
    type Err = StepKeywordParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let keyword = match trimmed.to_ascii_lowercase().as_str() {
            "given" => Self::Given,
            "when" => Self::When,
            "then" => Self::Then,
            "and" | "*" => Self::And,
            "but" => Self::But,
            _ => return Err(StepKeywordParseError(trimmed.to_string())),
        };
        Ok(keyword)
    }
}

/// The parser records the resolved type of every step, so conjunctions
/// never appear here.
impl From<StepType> for StepKeyword {
    fn from(ty: StepType) -> Self {
        match ty {
            StepType::Given => Self::Given,
            StepType::When => Self::When,
            StepType::Then => Self::Then,
        }
    }
}
