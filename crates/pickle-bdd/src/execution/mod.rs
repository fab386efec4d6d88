//! Scenario execution.
//!
//! [`ScenarioRunner`] drives one pickle through its steps:
//!
//! 1. resolve the scenario's fixtures through a [`FixtureProvider`];
//! 2. for each step in order, match it, check the definition's required
//!    fixtures and invoke the handler under `catch_unwind`;
//! 3. after the first failure, skip every remaining step without invoking it.
//!
//! Failures are recovered at the scenario boundary and returned in the
//! [`ScenarioOutcome`], so one scenario never aborts a run.

mod error;
mod outcome;
mod state;

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::events::{RunListener, ScenarioEvent, StepEvent};
use crate::matcher::{StepMatch, StepMatcher};
use crate::model::{Feature, Pickle, PickleStep};
use crate::registry::{ScopePath, StepDefinition, StepRegistry};
use crate::{FixtureProvider, Fixtures, StepContext, StepError, StepKeyword, panic_message};

pub use error::ScenarioError;
pub use outcome::{IntoStepOutcome, StepExecution};
pub use state::{ScenarioState, StepState, StepStatus};

/// Recorded result of one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepResult {
    /// Keyword as written in the scenario.
    pub keyword: String,
    /// Step text.
    pub text: String,
    /// Source line of the step.
    pub line: u32,
    /// Final status.
    pub status: StepStatus,
    /// Wall-clock time spent matching and executing; zero when skipped.
    pub duration: Duration,
    /// Rendered failure, present only on the scenario's first failing step.
    pub error: Option<String>,
    /// `file:line` of the definition that ran, when one was matched.
    pub location: Option<String>,
}

impl StepResult {
    fn new(step: &PickleStep, status: StepStatus) -> Self {
        Self {
            keyword: step.keyword.clone(),
            text: step.text.clone(),
            line: step.line,
            status,
            duration: Duration::ZERO,
            error: None,
            location: None,
        }
    }
}

/// Everything known about a finished scenario.
#[derive(Debug, Clone)]
pub struct ScenarioOutcome {
    /// Stable identifier of the test case.
    pub test_id: String,
    /// Terminal state.
    pub state: ScenarioState,
    /// One result per declared step, in order.
    pub steps: Vec<StepResult>,
    /// The first fatal condition, if any.
    pub error: Option<ScenarioError>,
    /// Wall-clock time of the whole scenario.
    pub duration: Duration,
}

impl ScenarioOutcome {
    /// Whether the scenario passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.state == ScenarioState::Passed
    }

    /// Step statuses in declared order.
    #[must_use]
    pub fn statuses(&self) -> Vec<StepStatus> {
        self.steps.iter().map(|step| step.status).collect()
    }

    /// Surface the scenario's fatal condition to the host.
    ///
    /// # Errors
    /// Returns the [`ScenarioError`] that stopped the scenario.
    pub fn into_result(self) -> Result<(), ScenarioError> {
        self.error.map_or(Ok(()), Err)
    }

    /// Panic with the scenario's fatal condition, if any.
    ///
    /// # Panics
    /// Panics when the scenario did not pass.
    #[track_caller]
    pub fn assert_passed(&self) {
        if let Some(err) = &self.error {
            panic!("scenario {} failed: {err}", self.test_id);
        }
    }
}

/// Runs pickles against a registry.
///
/// # Examples
/// ```
/// use pickle_bdd::{Feature, Fixtures, Pickle, ScenarioRunner, StepRegistry, StepStatus};
///
/// let mut builder = StepRegistry::builder();
/// builder.given("a step", |_ctx| ()).expect("valid pattern");
/// let registry = builder.build();
///
/// let feature = Feature::new("demo.feature");
/// let pickle = Pickle::new("demo", 2)
///     .with_step("Given", "a step", 3)
///     .with_step("And", "an unknown step", 4);
/// let outcome = ScenarioRunner::new(&registry).run(&feature, &pickle, &Fixtures::new(), &mut ());
/// assert_eq!(outcome.statuses(), vec![StepStatus::Passed, StepStatus::Failed]);
/// assert!(outcome.into_result().is_err());
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner<'r> {
    matcher: StepMatcher<'r>,
    scope: ScopePath,
}

impl<'r> ScenarioRunner<'r> {
    /// Run against `registry` from the root scope.
    #[must_use]
    pub fn new(registry: &'r StepRegistry) -> Self {
        Self {
            matcher: StepMatcher::new(registry),
            scope: ScopePath::root(),
        }
    }

    /// Match steps from `scope` instead of the root.
    #[must_use]
    pub fn with_scope(mut self, scope: ScopePath) -> Self {
        self.scope = scope;
        self
    }

    /// Scope steps are matched from.
    #[must_use]
    pub fn scope(&self) -> &ScopePath {
        &self.scope
    }

    /// Run every step of `pickle`, reporting each to `listener`.
    pub fn run(
        &self,
        feature: &Feature,
        pickle: &Pickle,
        fixtures: &dyn FixtureProvider,
        listener: &mut dyn RunListener,
    ) -> ScenarioOutcome {
        let started = Instant::now();
        let test_id = pickle.test_id(feature);
        let mut execution = Execution::new(self.matcher, &self.scope);
        match fixtures.provide(feature, pickle) {
            Ok(resolved) => execution.start(resolved),
            Err(err) => execution.abort(ScenarioError::from(err)),
        }

        let mut steps = Vec::with_capacity(pickle.steps.len());
        for step in &pickle.steps {
            let result = execution.step(step);
            listener.on_step_finished(&StepEvent {
                feature,
                pickle,
                step,
                result: &result,
            });
            steps.push(result);
        }

        let (state, error) = execution.finish();
        if let Some(err) = &error {
            warn!("scenario {test_id} did not pass: {err}");
        } else {
            debug!("scenario {test_id} passed");
        }
        let outcome = ScenarioOutcome {
            test_id,
            state,
            steps,
            error,
            duration: started.elapsed(),
        };
        listener.on_scenario_finished(&ScenarioEvent {
            feature,
            pickle,
            outcome: &outcome,
        });
        outcome
    }
}

/// Per-scenario execution state.
struct Execution<'r, 's> {
    matcher: StepMatcher<'r>,
    scope: &'s ScopePath,
    state: ScenarioState,
    fixtures: Fixtures,
    previous: Option<StepKeyword>,
    error: Option<ScenarioError>,
}

impl<'r, 's> Execution<'r, 's> {
    fn new(matcher: StepMatcher<'r>, scope: &'s ScopePath) -> Self {
        Self {
            matcher,
            scope,
            state: ScenarioState::NotStarted,
            fixtures: Fixtures::new(),
            previous: None,
            error: None,
        }
    }

    fn transition(&mut self, next: ScenarioState) {
        if let Some(state) = self.state.advance(next) {
            self.state = state;
        }
    }

    fn start(&mut self, fixtures: Fixtures) {
        self.fixtures = fixtures;
        self.transition(ScenarioState::Running);
    }

    fn abort(&mut self, err: ScenarioError) {
        self.transition(ScenarioState::Errored);
        self.error = Some(err);
    }

    fn step(&mut self, step: &PickleStep) -> StepResult {
        if self.state != ScenarioState::Running {
            return StepResult::new(step, StepStatus::Skipped);
        }
        let started = Instant::now();
        let mut phase = StepState::Pending;
        advance(&mut phase, StepState::Matching);
        let (location, result) = match self.matcher.match_step(self.scope, step, self.previous) {
            Ok(bound) => {
                self.previous = Some(bound.keyword);
                advance(&mut phase, StepState::Executing);
                let location = format!(
                    "{}:{}",
                    bound.definition.location().file(),
                    bound.definition.location().line()
                );
                let result = self
                    .invoke(step, &bound)
                    .map_err(|err| ScenarioError::execution(step, bound.keyword, err));
                (Some(location), result)
            }
            Err(err) => (None, Err(ScenarioError::from_match(step, err))),
        };

        let status = match result {
            Ok(()) => {
                advance(&mut phase, StepState::Passed);
                StepStatus::Passed
            }
            Err(err) => {
                advance(&mut phase, StepState::Failed);
                self.fail(err);
                StepStatus::Failed
            }
        };
        debug_assert_eq!(phase.status(), Some(status));
        StepResult {
            duration: started.elapsed(),
            error: if status == StepStatus::Failed {
                self.error.as_ref().map(ToString::to_string)
            } else {
                None
            },
            location,
            ..StepResult::new(step, status)
        }
    }

    fn invoke(&mut self, step: &PickleStep, bound: &StepMatch) -> Result<(), StepError> {
        validate_required_fixtures(&bound.definition, &self.fixtures)?;
        let ctx = StepContext::new(step, bound.keyword, &bound.args, &self.fixtures);
        let execution = catch_unwind(AssertUnwindSafe(|| bound.definition.invoke(&ctx)))
            .unwrap_or_else(|payload| {
                Err(StepError::Panic {
                    message: panic_message(payload.as_ref()),
                })
            })?;
        if let (Some(name), Some(value)) = (
            bound.definition.target_fixture_name(),
            execution.into_value(),
        ) {
            self.fixtures = self.fixtures.with_shared(name, Arc::from(value));
        }
        Ok(())
    }

    fn fail(&mut self, err: ScenarioError) {
        self.transition(ScenarioState::Failed);
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    fn finish(mut self) -> (ScenarioState, Option<ScenarioError>) {
        self.transition(ScenarioState::Passed);
        (self.state, self.error)
    }
}

fn advance(phase: &mut StepState, next: StepState) {
    if let Some(state) = phase.advance(next) {
        *phase = state;
    }
}

/// Check that every fixture the definition declares is present.
fn validate_required_fixtures(
    definition: &StepDefinition,
    fixtures: &Fixtures,
) -> Result<(), StepError> {
    let missing: Vec<String> = definition
        .fixtures()
        .iter()
        .filter(|name| !fixtures.contains(name))
        .cloned()
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    Err(StepError::MissingFixtures {
        pattern: definition.pattern().as_str().to_string(),
        missing,
        available: fixtures.names().into_iter().map(String::from).collect(),
    })
}
