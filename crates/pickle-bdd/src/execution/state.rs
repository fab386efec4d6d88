//! Scenario and step state machines.
//!
//! A scenario moves `NotStarted -> Running` and ends in exactly one of
//! `Passed`, `Failed` or `Errored`. Each step moves
//! `Pending -> Matching -> Executing` and ends `Passed`, `Failed` or
//! `Skipped`; a step skipped after an earlier failure goes straight from
//! `Pending` to `Skipped`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle of a scenario run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ScenarioState {
    /// Not yet started.
    #[default]
    NotStarted,
    /// Steps are executing.
    Running,
    /// Every step passed.
    Passed,
    /// A step could not be matched or did not pass.
    Failed,
    /// Setup failed before any step ran.
    Errored,
}

impl ScenarioState {
    /// Whether the scenario has finished.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Passed | Self::Failed | Self::Errored)
    }

    /// Move to `next`, returning `None` for an illegal transition.
    #[must_use]
    pub const fn advance(self, next: Self) -> Option<Self> {
        match (self, next) {
            (Self::NotStarted, Self::Running | Self::Errored)
            | (Self::Running, Self::Passed | Self::Failed) => Some(next),
            _ => None,
        }
    }
}

/// Lifecycle of a single step within a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum StepState {
    /// Waiting for its turn.
    #[default]
    Pending,
    /// Being bound to a definition.
    Matching,
    /// Its handler is running.
    Executing,
    /// The handler returned successfully.
    Passed,
    /// Matching or execution failed.
    Failed,
    /// Never executed.
    Skipped,
}

impl StepState {
    /// Whether the step has finished.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Passed | Self::Failed | Self::Skipped)
    }

    /// Move to `next`, returning `None` for an illegal transition.
    #[must_use]
    pub const fn advance(self, next: Self) -> Option<Self> {
        match (self, next) {
            (Self::Pending, Self::Matching | Self::Skipped)
            | (Self::Matching, Self::Executing | Self::Failed)
            | (Self::Executing, Self::Passed | Self::Failed) => Some(next),
            _ => None,
        }
    }

    /// Reported status of a finished step.
    #[must_use]
    pub const fn status(self) -> Option<StepStatus> {
        match self {
            Self::Passed => Some(StepStatus::Passed),
            Self::Failed => Some(StepStatus::Failed),
            Self::Skipped => Some(StepStatus::Skipped),
            Self::Pending | Self::Matching | Self::Executing => None,
        }
    }
}

/// Final status of a step as it appears in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// The step passed.
    Passed,
    /// The step failed.
    Failed,
    /// The step was not executed.
    Skipped,
}

impl StepStatus {
    /// Lowercase status name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ScenarioState::NotStarted, ScenarioState::Running, true)]
    #[case(ScenarioState::NotStarted, ScenarioState::Errored, true)]
    #[case(ScenarioState::NotStarted, ScenarioState::Passed, false)]
    #[case(ScenarioState::Running, ScenarioState::Failed, true)]
    #[case(ScenarioState::Running, ScenarioState::Errored, false)]
    #[case(ScenarioState::Failed, ScenarioState::Passed, false)]
    #[case(ScenarioState::Passed, ScenarioState::Failed, false)]
    fn scenario_transitions(
        #[case] from: ScenarioState,
        #[case] to: ScenarioState,
        #[case] allowed: bool,
    ) {
        assert_eq!(from.advance(to).is_some(), allowed);
    }

    #[rstest]
    #[case(StepState::Pending, StepState::Matching, true)]
    #[case(StepState::Pending, StepState::Skipped, true)]
    #[case(StepState::Pending, StepState::Executing, false)]
    #[case(StepState::Matching, StepState::Failed, true)]
    #[case(StepState::Matching, StepState::Passed, false)]
    #[case(StepState::Executing, StepState::Passed, true)]
    #[case(StepState::Executing, StepState::Skipped, false)]
    #[case(StepState::Failed, StepState::Passed, false)]
    fn step_transitions(#[case] from: StepState, #[case] to: StepState, #[case] allowed: bool) {
        assert_eq!(from.advance(to).is_some(), allowed);
    }

    #[test]
    fn only_terminal_steps_have_a_status() {
        assert_eq!(StepState::Executing.status(), None);
        assert_eq!(StepState::Skipped.status(), Some(StepStatus::Skipped));
        assert_eq!(StepStatus::Failed.to_string(), "failed");
    }
}
