//! Scenario-fatal errors.

use thiserror::Error;

use crate::matcher::MatchError;
use crate::{FixtureError, PickleStep, StepError, StepKeyword};

/// The first fatal condition of a scenario.
///
/// Each variant stops the scenario; the run itself carries on with the next
/// scenario.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ScenarioError {
    /// No definition matches the step.
    #[error("step definition not found for {keyword} '{text}' (line {line})")]
    StepDefinitionNotFound {
        /// Effective keyword.
        keyword: StepKeyword,
        /// Step text.
        text: String,
        /// Source line of the step.
        line: u32,
    },
    /// Several definitions match the step equally well.
    #[error(
        "ambiguous step definition for {keyword} '{text}' (line {line}); candidates: {}",
        .candidates.iter().map(|c| format!("'{c}'")).collect::<Vec<_>>().join(", ")
    )]
    AmbiguousStepDefinition {
        /// Effective keyword.
        keyword: StepKeyword,
        /// Step text.
        text: String,
        /// Source line of the step.
        line: u32,
        /// Patterns of the tied definitions.
        candidates: Vec<String>,
    },
    /// The handler failed, panicked or lacked a required fixture.
    #[error("step failed: {keyword} '{text}' (line {line}): {source}")]
    StepExecutionFailed {
        /// Effective keyword.
        keyword: StepKeyword,
        /// Step text.
        text: String,
        /// Source line of the step.
        line: u32,
        /// Failure raised for the step.
        source: StepError,
    },
    /// Fixtures could not be resolved before the first step.
    #[error("fixture resolution failed: {0}")]
    FixtureResolutionFailed(#[from] FixtureError),
}

impl ScenarioError {
    pub(crate) fn from_match(step: &PickleStep, err: MatchError) -> Self {
        match err {
            MatchError::NotFound { keyword, text } => Self::StepDefinitionNotFound {
                keyword,
                text,
                line: step.line,
            },
            MatchError::Ambiguous {
                keyword,
                text,
                candidates,
            } => Self::AmbiguousStepDefinition {
                keyword,
                text,
                line: step.line,
                candidates,
            },
        }
    }

    pub(crate) fn execution(step: &PickleStep, keyword: StepKeyword, source: StepError) -> Self {
        Self::StepExecutionFailed {
            keyword,
            text: step.text.clone(),
            line: step.line,
            source,
        }
    }

    /// The underlying step error, for execution failures.
    #[must_use]
    pub fn step_error(&self) -> Option<&StepError> {
        match self {
            Self::StepExecutionFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}
