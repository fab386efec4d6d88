//! Step arguments, fixtures and the context handed to step handlers.
//!
//! Fixtures form an immutable keyed bundle resolved once per scenario. A step
//! whose definition declares a target fixture publishes its return value by
//! producing a new bundle for the remaining steps; earlier bundles are never
//! mutated.

use std::any::{Any, type_name};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use derive_more::{Deref, From, IntoIterator};
use hashbrown::HashMap;

use crate::model::{DataTable, Feature, Pickle, PickleStep};
use crate::{FixtureError, StepError, StepKeyword};

/// Named values captured from step text, in pattern order.
///
/// # Examples
/// ```
/// use pickle_bdd::StepArgs;
///
/// let args = StepArgs::from(vec![("count".to_string(), "3".to_string())]);
/// assert_eq!(args.get("count"), Some("3"));
/// assert_eq!(args.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref, From, IntoIterator)]
#[into_iterator(owned, ref)]
pub struct StepArgs(Vec<(String, String)>);

impl StepArgs {
    /// Look up a captured value by placeholder or group name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find_map(|(key, value)| (key == name).then_some(value.as_str()))
    }
}

type SharedValue = Arc<dyn Any + Send + Sync>;

/// Immutable bundle of named fixtures available to a scenario's steps.
///
/// # Examples
/// ```
/// use pickle_bdd::Fixtures;
///
/// let fixtures = Fixtures::new().with("base_url", String::from("http://localhost"));
/// assert_eq!(fixtures.get::<String>("base_url").map(String::as_str), Some("http://localhost"));
/// assert!(fixtures.get::<u32>("base_url").is_none());
/// ```
#[derive(Clone, Default)]
pub struct Fixtures {
    values: HashMap<String, SharedValue>,
}

impl Fixtures {
    /// Create an empty bundle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a bundle extended with `value` under `name`.
    #[must_use]
    pub fn with<T: Any + Send + Sync>(mut self, name: impl Into<String>, value: T) -> Self {
        self.insert(name, value);
        self
    }

    /// Add or replace the fixture called `name`.
    pub fn insert<T: Any + Send + Sync>(&mut self, name: impl Into<String>, value: T) {
        self.values.insert(name.into(), Arc::new(value));
    }

    pub(crate) fn with_shared(&self, name: &str, value: SharedValue) -> Self {
        let mut next = self.clone();
        next.values.insert(name.to_string(), value);
        next
    }

    /// Borrow the fixture called `name` when it holds a `T`.
    #[must_use]
    pub fn get<T: Any>(&self, name: &str) -> Option<&T> {
        self.values.get(name)?.as_ref().downcast_ref::<T>()
    }

    /// Whether a fixture called `name` exists, whatever its type.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Fixture names in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.values.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of fixtures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the bundle is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for Fixtures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fixtures")
            .field("names", &self.names())
            .finish()
    }
}

/// Resolves the fixtures a scenario starts with.
///
/// Implemented for [`Fixtures`] (every scenario gets a clone) and for
/// closures taking the feature and pickle.
///
/// # Examples
/// ```
/// use pickle_bdd::{Feature, FixtureError, FixtureProvider, Fixtures, Pickle};
///
/// let provider = |_: &Feature, pickle: &Pickle| {
///     if pickle.has_tag("offline") {
///         Err(FixtureError::new("network disabled"))
///     } else {
///         Ok(Fixtures::new().with("host", "example.org"))
///     }
/// };
/// let feature = Feature::new("net.feature");
/// assert!(provider.provide(&feature, &Pickle::new("online", 2)).is_ok());
/// assert!(provider
///     .provide(&feature, &Pickle::new("offline", 5).with_tag("offline", 4))
///     .is_err());
/// ```
pub trait FixtureProvider {
    /// Build the fixture bundle for `pickle`.
    ///
    /// # Errors
    /// Returns [`FixtureError`] when setup fails; the scenario is then
    /// reported as errored without running any step.
    fn provide(&self, feature: &Feature, pickle: &Pickle) -> Result<Fixtures, FixtureError>;
}

impl FixtureProvider for Fixtures {
    fn provide(&self, _feature: &Feature, _pickle: &Pickle) -> Result<Fixtures, FixtureError> {
        Ok(self.clone())
    }
}

impl<F> FixtureProvider for F
where
    F: Fn(&Feature, &Pickle) -> Result<Fixtures, FixtureError>,
{
    fn provide(&self, feature: &Feature, pickle: &Pickle) -> Result<Fixtures, FixtureError> {
        self(feature, pickle)
    }
}

/// Everything a step handler can see while it runs.
///
/// Accessors return [`StepError`] so handlers can use `?`.
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    step: &'a PickleStep,
    keyword: StepKeyword,
    args: &'a StepArgs,
    fixtures: &'a Fixtures,
}

impl<'a> StepContext<'a> {
    /// Assemble a context. The runner does this for every matched step;
    /// tests may build one to call a handler directly.
    #[must_use]
    pub fn new(
        step: &'a PickleStep,
        keyword: StepKeyword,
        args: &'a StepArgs,
        fixtures: &'a Fixtures,
    ) -> Self {
        Self {
            step,
            keyword,
            args,
            fixtures,
        }
    }

    /// The step being executed.
    #[must_use]
    pub fn step(&self) -> &'a PickleStep {
        self.step
    }

    /// Effective keyword after conjunction resolution.
    #[must_use]
    pub fn keyword(&self) -> StepKeyword {
        self.keyword
    }

    /// Step text.
    #[must_use]
    pub fn text(&self) -> &'a str {
        &self.step.text
    }

    /// All captured arguments.
    #[must_use]
    pub fn args(&self) -> &'a StepArgs {
        self.args
    }

    /// Captured text for `name`.
    ///
    /// # Errors
    /// Returns [`StepError::MissingArgument`] when the pattern has no such
    /// capture.
    pub fn arg(&self, name: &str) -> Result<&'a str, StepError> {
        self.args
            .get(name)
            .ok_or_else(|| StepError::MissingArgument {
                name: name.to_string(),
            })
    }

    /// Captured value for `name` converted with [`FromStr`].
    ///
    /// # Errors
    /// Returns [`StepError::MissingArgument`] or
    /// [`StepError::InvalidArgument`].
    pub fn parse_arg<T>(&self, name: &str) -> Result<T, StepError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        let value = self.arg(name)?;
        value.parse().map_err(|err: T::Err| StepError::InvalidArgument {
            name: name.to_string(),
            value: value.to_string(),
            reason: err.to_string(),
        })
    }

    /// Borrow the fixture called `name` as a `T`.
    ///
    /// # Errors
    /// Returns [`StepError::MissingFixture`] when it is absent or of another
    /// type.
    pub fn fixture<T: Any>(&self, name: &str) -> Result<&'a T, StepError> {
        self.fixtures
            .get::<T>(name)
            .ok_or_else(|| StepError::MissingFixture {
                name: name.to_string(),
                ty: type_name::<T>().to_string(),
            })
    }

    /// The scenario's current fixture bundle.
    #[must_use]
    pub fn fixtures(&self) -> &'a Fixtures {
        self.fixtures
    }

    /// The step's data table.
    ///
    /// # Errors
    /// Returns [`StepError::MissingDataTable`] when none is attached.
    pub fn datatable(&self) -> Result<&'a DataTable, StepError> {
        self.step.datatable().ok_or(StepError::MissingDataTable)
    }

    /// The step's doc string.
    ///
    /// # Errors
    /// Returns [`StepError::MissingDocString`] when none is attached.
    pub fn docstring(&self) -> Result<&'a str, StepError> {
        self.step.docstring().ok_or(StepError::MissingDocString)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn step() -> PickleStep {
        PickleStep::new("Given", "3 apples", 1)
    }

    #[fixture]
    fn args() -> StepArgs {
        StepArgs::from(vec![
            ("count".to_string(), "3".to_string()),
            ("fruit".to_string(), "apples".to_string()),
        ])
    }

    #[rstest]
    fn parses_arguments(step: PickleStep, args: StepArgs) {
        let fixtures = Fixtures::new();
        let ctx = StepContext::new(&step, StepKeyword::Given, &args, &fixtures);
        assert_eq!(ctx.parse_arg::<u32>("count"), Ok(3));
        assert_eq!(ctx.arg("fruit"), Ok("apples"));
        assert_eq!(
            ctx.arg("colour"),
            Err(StepError::MissingArgument {
                name: "colour".into()
            })
        );
        let Err(StepError::InvalidArgument { name, value, .. }) = ctx.parse_arg::<u32>("fruit")
        else {
            panic!("expected conversion failure");
        };
        assert_eq!((name.as_str(), value.as_str()), ("fruit", "apples"));
    }

    #[rstest]
    fn fixtures_are_typed(step: PickleStep, args: StepArgs) {
        let fixtures = Fixtures::new().with("limit", 10_u32);
        let ctx = StepContext::new(&step, StepKeyword::Given, &args, &fixtures);
        assert_eq!(ctx.fixture::<u32>("limit"), Ok(&10));
        let Err(StepError::MissingFixture { ty, .. }) = ctx.fixture::<String>("limit") else {
            panic!("wrong type should be reported as missing");
        };
        assert!(ty.contains("String"));
    }

    #[rstest]
    fn missing_attachments_are_errors(step: PickleStep, args: StepArgs) {
        let fixtures = Fixtures::new();
        let ctx = StepContext::new(&step, StepKeyword::Given, &args, &fixtures);
        assert_eq!(ctx.datatable(), Err(StepError::MissingDataTable));
        assert_eq!(ctx.docstring(), Err(StepError::MissingDocString));
    }

    #[test]
    fn shared_insertion_leaves_original_bundle_untouched() {
        let base = Fixtures::new().with("a", 1_i32);
        let next = base.with_shared("b", Arc::new(2_i32));
        assert_eq!(base.names(), vec!["a"]);
        assert_eq!(next.names(), vec!["a", "b"]);
        assert_eq!(next.get::<i32>("b"), Some(&2));
    }
}
