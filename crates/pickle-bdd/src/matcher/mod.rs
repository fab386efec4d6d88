//! Step matching.
//!
//! The matcher turns a step into exactly one definition. It resolves the
//! effective keyword, asks the registry for candidates and ranks them:
//!
//! 1. the narrowest scope layer with any candidate masks broader layers;
//! 2. within that layer an exact literal match beats every parameterized one;
//! 3. otherwise the most specific pattern wins, and a tie is ambiguous.
//!
//! Matching has no side effects, so the same inputs always yield the same
//! definition.

use std::sync::Arc;

use log::debug;
use thiserror::Error;

use crate::registry::Candidate;
use crate::{PickleStep, ScopePath, StepArgs, StepDefinition, StepKeyword, StepRegistry};

/// Reasons a step could not be bound to a definition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum MatchError {
    /// No definition matches the step.
    #[error("no step definition matches {keyword} '{text}'")]
    NotFound {
        /// Effective keyword.
        keyword: StepKeyword,
        /// Step text.
        text: String,
    },
    /// Several definitions match equally well.
    #[error(
        "step {keyword} '{text}' is ambiguous; candidates: {}",
        .candidates.iter().map(|c| format!("'{c}'")).collect::<Vec<_>>().join(", ")
    )]
    Ambiguous {
        /// Effective keyword.
        keyword: StepKeyword,
        /// Step text.
        text: String,
        /// Patterns of every equally ranked definition.
        candidates: Vec<String>,
    },
}

/// A step bound to its definition.
#[derive(Debug, Clone)]
pub struct StepMatch {
    /// Winning definition.
    pub definition: Arc<StepDefinition>,
    /// Values captured from the step text.
    pub args: StepArgs,
    /// Keyword the step was matched under.
    pub keyword: StepKeyword,
}

/// Compute the keyword a step is matched under.
///
/// `And`, `But`, `*` and unrecognised keywords inherit `previous`, falling
/// back to `Given` for the first step.
///
/// # Examples
/// ```
/// use pickle_bdd::{PickleStep, StepKeyword};
/// use pickle_bdd::matcher::effective_keyword;
///
/// let step = PickleStep::new("And", "another thing", 3);
/// assert_eq!(effective_keyword(&step, Some(StepKeyword::Then)), StepKeyword::Then);
/// assert_eq!(effective_keyword(&step, None), StepKeyword::Given);
/// ```
#[must_use]
pub fn effective_keyword(step: &PickleStep, previous: Option<StepKeyword>) -> StepKeyword {
    step.step_keyword()
        .unwrap_or(StepKeyword::And)
        .resolve(previous)
}

/// Stateless view over a registry that binds steps to definitions.
#[derive(Debug, Clone, Copy)]
pub struct StepMatcher<'r> {
    registry: &'r StepRegistry,
}

impl<'r> StepMatcher<'r> {
    /// Match against `registry`.
    #[must_use]
    pub fn new(registry: &'r StepRegistry) -> Self {
        Self { registry }
    }

    /// Bind `step` to one definition visible from `scope`.
    ///
    /// `previous` is the effective keyword of the preceding step.
    ///
    /// # Errors
    /// Returns [`MatchError::NotFound`] when nothing matches and
    /// [`MatchError::Ambiguous`] when the best candidates tie.
    pub fn match_step(
        &self,
        scope: &ScopePath,
        step: &PickleStep,
        previous: Option<StepKeyword>,
    ) -> Result<StepMatch, MatchError> {
        let keyword = effective_keyword(step, previous);
        let text = step.text.as_str();
        let candidates = self.registry.find_candidates(scope, keyword, text);
        let Some(nearest) = candidates.iter().map(|c| c.depth).min() else {
            return Err(MatchError::NotFound {
                keyword,
                text: text.to_string(),
            });
        };
        let layer: Vec<Candidate> = candidates
            .into_iter()
            .filter(|c| c.depth == nearest)
            .collect();
        let winner = select(layer).map_err(|candidates| MatchError::Ambiguous {
            keyword,
            text: text.to_string(),
            candidates,
        })?;
        debug!(
            "matched {keyword} '{text}' to '{}' at {}",
            winner.definition.pattern(),
            winner.definition.location()
        );
        Ok(StepMatch {
            definition: winner.definition,
            args: winner.args,
            keyword,
        })
    }
}

/// Pick the winner among candidates of one layer, or return the tied
/// patterns.
///
/// An unscored raw regex ties with every other candidate in its pool.
fn select(layer: Vec<Candidate>) -> Result<Candidate, Vec<String>> {
    let (exact, parameterized): (Vec<_>, Vec<_>) = layer
        .into_iter()
        .partition(|c| c.definition.pattern().literal().is_some());
    let pool = if exact.is_empty() { parameterized } else { exact };
    let best = pool
        .iter()
        .filter_map(|c| c.definition.pattern().specificity())
        .max();
    let top: Vec<Candidate> = pool
        .into_iter()
        .filter(|c| {
            c.definition
                .pattern()
                .specificity()
                .is_none_or(|score| Some(score) == best)
        })
        .collect();
    match <[Candidate; 1]>::try_from(top) {
        Ok([winner]) => Ok(winner),
        Err(tied) => Err(tied
            .iter()
            .map(|c| c.definition.pattern().as_str().to_string())
            .collect()),
    }
}

#[cfg(test)]
mod tests;
