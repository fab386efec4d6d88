//! Step registration and lookup.
//!
//! Definitions are collected by a [`RegistryBuilder`] into scope layers and
//! frozen into an immutable [`StepRegistry`]. Each layer maps a keyword to its
//! definitions in registration order; a definition registered again with the
//! same pattern in the same layer replaces the earlier one. Lookup walks the
//! layers visible from a scope, narrowest first, and returns every definition
//! whose pattern matches. Choosing a winner is the matcher's job.

mod scope;

use std::fmt;
use std::panic::Location;
use std::sync::Arc;

use hashbrown::HashMap;
use log::debug;
use thiserror::Error;

use crate::execution::IntoStepOutcome;
use crate::{
    StepArgs, StepContext, StepError, StepExecution, StepKeyword, StepPattern, StepPatternError,
};

pub use scope::ScopePath;

/// Errors raised while registering step definitions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RegistryError {
    /// The pattern failed to compile.
    #[error("invalid step pattern '{pattern}': {source}")]
    InvalidPattern {
        /// Pattern text as supplied.
        pattern: String,
        /// Compilation failure.
        source: StepPatternError,
    },
    /// Definitions must use a primary keyword.
    #[error("step definitions cannot be registered for the conjunction keyword '{keyword}'")]
    ConjunctionKeyword {
        /// Offending keyword.
        keyword: StepKeyword,
    },
    /// A scope path contained an empty segment.
    #[error("invalid scope path '{scope}'")]
    InvalidScope {
        /// Scope text as supplied.
        scope: String,
    },
}

/// Type-erased step handler.
pub type StepHandler =
    Arc<dyn Fn(&StepContext<'_>) -> Result<StepExecution, StepError> + Send + Sync>;

/// A registered step: keyword, pattern and handler plus the fixtures it needs.
pub struct StepDefinition {
    keyword: StepKeyword,
    pattern: StepPattern,
    handler: StepHandler,
    fixtures: Vec<String>,
    target_fixture: Option<String>,
    location: &'static Location<'static>,
    scope: ScopePath,
}

impl StepDefinition {
    /// Define a step using placeholder pattern text.
    ///
    /// # Errors
    /// Returns [`RegistryError::ConjunctionKeyword`] for `And`/`But` and
    /// [`RegistryError::InvalidPattern`] when the pattern does not compile.
    ///
    /// # Examples
    /// ```
    /// use pickle_bdd::{StepDefinition, StepKeyword};
    ///
    /// let def = StepDefinition::new(StepKeyword::When, "I pay {amount:u32}", |_ctx| ())
    ///     .expect("valid definition")
    ///     .requires("wallet");
    /// assert_eq!(def.pattern().as_str(), "I pay {amount:u32}");
    /// assert_eq!(def.fixtures(), ["wallet".to_string()]);
    /// ```
    #[track_caller]
    pub fn new<F, R>(
        keyword: StepKeyword,
        pattern: &str,
        handler: F,
    ) -> Result<Self, RegistryError>
    where
        F: Fn(&StepContext<'_>) -> R + Send + Sync + 'static,
        R: IntoStepOutcome,
    {
        let compiled = StepPattern::new(pattern).map_err(|source| RegistryError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Self::from_pattern(keyword, compiled, handler)
    }

    /// Define a step using a raw regular expression.
    ///
    /// # Errors
    /// As for [`StepDefinition::new`].
    #[track_caller]
    pub fn regex<F, R>(
        keyword: StepKeyword,
        source: &str,
        handler: F,
    ) -> Result<Self, RegistryError>
    where
        F: Fn(&StepContext<'_>) -> R + Send + Sync + 'static,
        R: IntoStepOutcome,
    {
        let compiled = StepPattern::regex(source).map_err(|err| RegistryError::InvalidPattern {
            pattern: source.to_string(),
            source: err,
        })?;
        Self::from_pattern(keyword, compiled, handler)
    }

    #[track_caller]
    fn from_pattern<F, R>(
        keyword: StepKeyword,
        pattern: StepPattern,
        handler: F,
    ) -> Result<Self, RegistryError>
    where
        F: Fn(&StepContext<'_>) -> R + Send + Sync + 'static,
        R: IntoStepOutcome,
    {
        if keyword.is_conjunction() {
            return Err(RegistryError::ConjunctionKeyword { keyword });
        }
        Ok(Self {
            keyword,
            pattern,
            handler: Arc::new(move |ctx| handler(ctx).into_step_outcome()),
            fixtures: Vec::new(),
            target_fixture: None,
            location: Location::caller(),
            scope: ScopePath::root(),
        })
    }

    /// Declare a fixture that must be present before the step runs.
    #[must_use]
    pub fn requires(mut self, fixture: impl Into<String>) -> Self {
        self.fixtures.push(fixture.into());
        self
    }

    /// Publish the step's returned value as the fixture `name` for later steps.
    #[must_use]
    pub fn target_fixture(mut self, name: impl Into<String>) -> Self {
        self.target_fixture = Some(name.into());
        self
    }

    /// Keyword the definition is registered under.
    #[must_use]
    pub fn keyword(&self) -> StepKeyword {
        self.keyword
    }

    /// Compiled pattern.
    #[must_use]
    pub fn pattern(&self) -> &StepPattern {
        &self.pattern
    }

    /// Names of the fixtures the step requires.
    #[must_use]
    pub fn fixtures(&self) -> &[String] {
        &self.fixtures
    }

    /// Fixture name the step's value is published under, if any.
    #[must_use]
    pub fn target_fixture_name(&self) -> Option<&str> {
        self.target_fixture.as_deref()
    }

    /// Source location of the registration.
    #[must_use]
    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }

    /// Scope the definition was registered in.
    #[must_use]
    pub fn scope(&self) -> &ScopePath {
        &self.scope
    }

    /// Invoke the handler.
    ///
    /// # Errors
    /// Returns whatever [`StepError`] the handler produces.
    pub fn invoke(&self, ctx: &StepContext<'_>) -> Result<StepExecution, StepError> {
        (self.handler)(ctx)
    }
}

impl fmt::Debug for StepDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepDefinition")
            .field("keyword", &self.keyword)
            .field("pattern", &self.pattern.as_str())
            .field("fixtures", &self.fixtures)
            .field("target_fixture", &self.target_fixture)
            .field("location", &self.location)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
struct Layer {
    steps: HashMap<StepKeyword, Vec<Arc<StepDefinition>>>,
}

impl Layer {
    fn insert(&mut self, definition: StepDefinition) {
        let bucket = self.steps.entry(definition.keyword).or_default();
        let definition = Arc::new(definition);
        if let Some(slot) = bucket
            .iter_mut()
            .find(|existing| existing.pattern == definition.pattern)
        {
            debug!(
                "step '{} {}' registered at {} shadows the definition at {} in scope '{}'",
                definition.keyword,
                definition.pattern,
                definition.location,
                slot.location,
                definition.scope,
            );
            *slot = definition;
        } else {
            bucket.push(definition);
        }
    }
}

/// A definition whose pattern matched some step text.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// The matching definition.
    pub definition: Arc<StepDefinition>,
    /// Values captured from the step text.
    pub args: StepArgs,
    /// Distance from the queried scope; zero is the scope itself.
    pub depth: usize,
}

/// Collects step definitions before they are frozen into a [`StepRegistry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    layers: HashMap<ScopePath, Layer>,
}

impl RegistryBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `definition` to the layer named by its scope.
    pub fn add(&mut self, definition: StepDefinition) -> &mut Self {
        self.layers
            .entry(definition.scope.clone())
            .or_default()
            .insert(definition);
        self
    }

    /// Add `definition` to `scope`, overriding the scope it carries.
    pub fn add_scoped(&mut self, scope: &ScopePath, mut definition: StepDefinition) -> &mut Self {
        definition.scope = scope.clone();
        self.add(definition)
    }

    /// Register a `Given` step in the root scope.
    ///
    /// # Errors
    /// Returns [`RegistryError::InvalidPattern`] when the pattern does not
    /// compile.
    #[track_caller]
    pub fn given<F, R>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, RegistryError>
    where
        F: Fn(&StepContext<'_>) -> R + Send + Sync + 'static,
        R: IntoStepOutcome,
    {
        Ok(self.add(StepDefinition::new(StepKeyword::Given, pattern, handler)?))
    }

    /// Register a `When` step in the root scope.
    ///
    /// # Errors
    /// As for [`RegistryBuilder::given`].
    #[track_caller]
    pub fn when<F, R>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, RegistryError>
    where
        F: Fn(&StepContext<'_>) -> R + Send + Sync + 'static,
        R: IntoStepOutcome,
    {
        Ok(self.add(StepDefinition::new(StepKeyword::When, pattern, handler)?))
    }

    /// Register a `Then` step in the root scope.
    ///
    /// # Errors
    /// As for [`RegistryBuilder::given`].
    #[track_caller]
    pub fn then<F, R>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, RegistryError>
    where
        F: Fn(&StepContext<'_>) -> R + Send + Sync + 'static,
        R: IntoStepOutcome,
    {
        Ok(self.add(StepDefinition::new(StepKeyword::Then, pattern, handler)?))
    }

    /// Open a scope for registration.
    ///
    /// # Errors
    /// Returns [`RegistryError::InvalidScope`] for malformed paths.
    ///
    /// # Examples
    /// ```
    /// use pickle_bdd::StepRegistry;
    ///
    /// let mut builder = StepRegistry::builder();
    /// builder
    ///     .scope("checkout")
    ///     .expect("valid scope")
    ///     .given("a basket", |_ctx| ())
    ///     .expect("valid pattern");
    /// let registry = builder.build();
    /// assert_eq!(registry.len(), 1);
    /// ```
    pub fn scope(&mut self, path: &str) -> Result<ScopeBuilder<'_>, RegistryError> {
        let scope = ScopePath::parse(path)?;
        Ok(ScopeBuilder {
            builder: self,
            scope,
        })
    }

    /// Freeze the collected layers.
    #[must_use]
    pub fn build(self) -> StepRegistry {
        StepRegistry {
            layers: self.layers,
        }
    }
}

/// Registers definitions into one scope of a [`RegistryBuilder`].
#[derive(Debug)]
pub struct ScopeBuilder<'b> {
    builder: &'b mut RegistryBuilder,
    scope: ScopePath,
}

impl ScopeBuilder<'_> {
    /// Scope being registered into.
    #[must_use]
    pub fn path(&self) -> &ScopePath {
        &self.scope
    }

    /// Add `definition` to this scope.
    pub fn add(&mut self, definition: StepDefinition) -> &mut Self {
        self.builder.add_scoped(&self.scope, definition);
        self
    }

    /// Register a `Given` step in this scope.
    ///
    /// # Errors
    /// Returns [`RegistryError::InvalidPattern`] when the pattern does not
    /// compile.
    #[track_caller]
    pub fn given<F, R>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, RegistryError>
    where
        F: Fn(&StepContext<'_>) -> R + Send + Sync + 'static,
        R: IntoStepOutcome,
    {
        Ok(self.add(StepDefinition::new(StepKeyword::Given, pattern, handler)?))
    }

    /// Register a `When` step in this scope.
    ///
    /// # Errors
    /// As for [`ScopeBuilder::given`].
    #[track_caller]
    pub fn when<F, R>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, RegistryError>
    where
        F: Fn(&StepContext<'_>) -> R + Send + Sync + 'static,
        R: IntoStepOutcome,
    {
        Ok(self.add(StepDefinition::new(StepKeyword::When, pattern, handler)?))
    }

    /// Register a `Then` step in this scope.
    ///
    /// # Errors
    /// As for [`ScopeBuilder::given`].
    #[track_caller]
    pub fn then<F, R>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, RegistryError>
    where
        F: Fn(&StepContext<'_>) -> R + Send + Sync + 'static,
        R: IntoStepOutcome,
    {
        Ok(self.add(StepDefinition::new(StepKeyword::Then, pattern, handler)?))
    }
}

/// Frozen, thread-safe collection of step definitions.
#[derive(Debug, Default)]
pub struct StepRegistry {
    layers: HashMap<ScopePath, Layer>,
}

impl StepRegistry {
    /// Start collecting definitions.
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Total number of definitions across all layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers
            .values()
            .flat_map(|layer| layer.steps.values())
            .map(Vec::len)
            .sum()
    }

    /// Whether no definitions were registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Definitions registered directly in `scope` for `keyword`, in
    /// registration order.
    #[must_use]
    pub fn definitions(&self, scope: &ScopePath, keyword: StepKeyword) -> &[Arc<StepDefinition>] {
        self.layers
            .get(scope)
            .and_then(|layer| layer.steps.get(&keyword))
            .map_or(&[], Vec::as_slice)
    }

    /// Every definition visible from `scope` whose pattern matches `text`.
    ///
    /// Candidates are ordered by layer, narrowest first, then by registration
    /// order within the layer.
    #[must_use]
    pub fn find_candidates(
        &self,
        scope: &ScopePath,
        keyword: StepKeyword,
        text: &str,
    ) -> Vec<Candidate> {
        scope
            .ancestors()
            .enumerate()
            .flat_map(|(depth, layer)| {
                self.definitions(&layer, keyword)
                    .iter()
                    .filter_map(move |definition| {
                        definition.pattern.captures(text).map(|args| Candidate {
                            definition: Arc::clone(definition),
                            args,
                            depth,
                        })
                    })
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}
