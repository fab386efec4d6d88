//! Run events.
//!
//! The runner reports one [`StepEvent`] per step, in declared order, and then
//! one [`ScenarioEvent`]. Listeners see events in exactly that order; the
//! cucumber JSON aggregator is one such listener.

use crate::execution::{ScenarioOutcome, StepResult};
use crate::model::{Feature, Pickle, PickleStep};

/// A step has finished, passed or not, or was skipped.
#[derive(Debug, Clone, Copy)]
pub struct StepEvent<'a> {
    /// Feature the scenario belongs to.
    pub feature: &'a Feature,
    /// Scenario being run.
    pub pickle: &'a Pickle,
    /// Step that finished.
    pub step: &'a PickleStep,
    /// Its recorded result.
    pub result: &'a StepResult,
}

/// A scenario has finished.
#[derive(Debug, Clone, Copy)]
pub struct ScenarioEvent<'a> {
    /// Feature the scenario belongs to.
    pub feature: &'a Feature,
    /// Scenario that finished.
    pub pickle: &'a Pickle,
    /// Its outcome, including every step result.
    pub outcome: &'a ScenarioOutcome,
}

/// Receives run events. Both methods default to doing nothing.
pub trait RunListener {
    /// Called after each step.
    fn on_step_finished(&mut self, _event: &StepEvent<'_>) {}

    /// Called after each scenario.
    fn on_scenario_finished(&mut self, _event: &ScenarioEvent<'_>) {}
}

/// Listener that ignores every event.
impl RunListener for () {}

/// Fans events out to several listeners in registration order.
///
/// # Examples
/// ```
/// use pickle_bdd::{Listeners, RunListener, ScenarioEvent};
///
/// struct Count(usize);
/// impl RunListener for Count {
///     fn on_scenario_finished(&mut self, _event: &ScenarioEvent<'_>) {
///         self.0 += 1;
///     }
/// }
///
/// let mut listeners = Listeners::new();
/// listeners.push(Box::new(Count(0)));
/// assert_eq!(listeners.len(), 1);
/// ```
#[derive(Default)]
pub struct Listeners {
    inner: Vec<Box<dyn RunListener + Send>>,
}

impl Listeners {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a listener after the existing ones.
    pub fn push(&mut self, listener: Box<dyn RunListener + Send>) {
        self.inner.push(listener);
    }

    /// Number of listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether there are no listeners.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("len", &self.inner.len())
            .finish()
    }
}

impl RunListener for Listeners {
    fn on_step_finished(&mut self, event: &StepEvent<'_>) {
        for listener in &mut self.inner {
            listener.on_step_finished(event);
        }
    }

    fn on_scenario_finished(&mut self, event: &ScenarioEvent<'_>) {
        for listener in &mut self.inner {
            listener.on_scenario_finished(event);
        }
    }
}

impl<L: RunListener + ?Sized> RunListener for &mut L {
    fn on_step_finished(&mut self, event: &StepEvent<'_>) {
        (**self).on_step_finished(event);
    }

    fn on_scenario_finished(&mut self, event: &ScenarioEvent<'_>) {
        (**self).on_scenario_finished(event);
    }
}
