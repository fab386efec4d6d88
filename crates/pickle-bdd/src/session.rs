//! Run lifecycle.
//!
//! A [`Session`] ties a frozen registry to the run's listeners and, in the
//! coordinating process, the cucumber JSON aggregator. Scenarios run one at a
//! time through [`Session::run_scenario`] or a feature at a time through
//! [`Session::run_feature`]; [`Session::finish`] writes the report and returns
//! the tallies.

use camino::Utf8PathBuf;
use log::{debug, info};

use crate::events::{Listeners, RunListener, ScenarioEvent, StepEvent};
use crate::execution::{ScenarioOutcome, ScenarioRunner, ScenarioState};
use crate::model::{Feature, Pickle};
use crate::registry::{ScopePath, StepRegistry};
use crate::reporting::CucumberJsonAggregator;
use crate::{FixtureProvider, Fixtures, ReportConfig, ReportError};

/// Tallies of a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Scenarios that passed.
    pub passed: usize,
    /// Scenarios with a failed, unmatched or ambiguous step.
    pub failed: usize,
    /// Scenarios whose setup failed.
    pub errored: usize,
    /// Report written by this process, if any.
    pub report: Option<Utf8PathBuf>,
}

impl RunSummary {
    /// Number of scenarios run.
    #[must_use]
    pub fn total(&self) -> usize {
        self.passed + self.failed + self.errored
    }

    /// Whether every scenario passed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.errored == 0
    }
}

/// Drives scenarios and owns the run's listeners.
pub struct Session<'r> {
    runner: ScenarioRunner<'r>,
    fixtures: Box<dyn FixtureProvider + 'r>,
    listeners: Listeners,
    aggregator: Option<CucumberJsonAggregator>,
    summary: RunSummary,
}

impl<'r> Session<'r> {
    /// Start a session. The aggregator is installed only for a coordinator
    /// with a report path.
    #[must_use]
    pub fn new(config: &ReportConfig, registry: &'r StepRegistry) -> Self {
        let aggregator = CucumberJsonAggregator::create(config);
        if let Some(aggregator) = &aggregator {
            debug!("cucumber JSON report will be written to {}", aggregator.path());
        }
        Self {
            runner: ScenarioRunner::new(registry),
            fixtures: Box::new(Fixtures::new()),
            listeners: Listeners::new(),
            aggregator,
            summary: RunSummary::default(),
        }
    }

    /// Match steps from `scope`.
    #[must_use]
    pub fn with_scope(mut self, scope: ScopePath) -> Self {
        self.runner = self.runner.with_scope(scope);
        self
    }

    /// Resolve each scenario's fixtures with `provider`.
    #[must_use]
    pub fn with_fixtures(mut self, provider: impl FixtureProvider + 'r) -> Self {
        self.fixtures = Box::new(provider);
        self
    }

    /// Add a listener; listeners see events before the aggregator.
    #[must_use]
    pub fn with_listener(mut self, listener: Box<dyn RunListener + Send>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Whether this session aggregates a report.
    #[must_use]
    pub fn has_aggregator(&self) -> bool {
        self.aggregator.is_some()
    }

    /// The installed aggregator, if any.
    #[must_use]
    pub fn aggregator(&self) -> Option<&CucumberJsonAggregator> {
        self.aggregator.as_ref()
    }

    /// Tallies so far.
    #[must_use]
    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    /// Run one scenario of `feature`.
    pub fn run_scenario(&mut self, feature: &Feature, pickle: &Pickle) -> ScenarioOutcome {
        let mut fanout = Fanout {
            listeners: &mut self.listeners,
            aggregator: self.aggregator.as_mut(),
        };
        let outcome = self
            .runner
            .run(feature, pickle, self.fixtures.as_ref(), &mut fanout);
        match outcome.state {
            ScenarioState::Passed => self.summary.passed += 1,
            ScenarioState::Errored => self.summary.errored += 1,
            ScenarioState::Failed | ScenarioState::NotStarted | ScenarioState::Running => {
                self.summary.failed += 1;
            }
        }
        outcome
    }

    /// Run every scenario of `feature` in order.
    pub fn run_feature(&mut self, feature: &Feature) -> Vec<ScenarioOutcome> {
        feature
            .scenarios
            .iter()
            .map(|pickle| self.run_scenario(feature, pickle))
            .collect()
    }

    /// Write the report, if this process aggregates one, and return the
    /// tallies.
    ///
    /// # Errors
    /// Returns [`ReportError`] when the report cannot be written.
    pub fn finish(mut self) -> Result<RunSummary, ReportError> {
        if let Some(aggregator) = self.aggregator.as_mut() {
            let path = aggregator.flush()?;
            self.summary.report = Some(path.to_path_buf());
        }
        info!(
            "{} scenarios: {} passed, {} failed, {} errored",
            self.summary.total(),
            self.summary.passed,
            self.summary.failed,
            self.summary.errored
        );
        Ok(self.summary)
    }
}

impl std::fmt::Debug for Session<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("runner", &self.runner)
            .field("listeners", &self.listeners)
            .field(
                "report",
                &self.aggregator.as_ref().map(CucumberJsonAggregator::path),
            )
            .field("summary", &self.summary)
            .finish_non_exhaustive()
    }
}

struct Fanout<'a> {
    listeners: &'a mut Listeners,
    aggregator: Option<&'a mut CucumberJsonAggregator>,
}

impl RunListener for Fanout<'_> {
    fn on_step_finished(&mut self, event: &StepEvent<'_>) {
        self.listeners.on_step_finished(event);
        if let Some(aggregator) = self.aggregator.as_deref_mut() {
            aggregator.on_step_finished(event);
        }
    }

    fn on_scenario_finished(&mut self, event: &ScenarioEvent<'_>) {
        self.listeners.on_scenario_finished(event);
        if let Some(aggregator) = self.aggregator.as_deref_mut() {
            aggregator.on_scenario_finished(event);
        }
    }
}
