//! Core runtime for `pickle-bdd`.
//!
//! The crate executes resolved Gherkin scenarios ("pickles") against a
//! registry of step definitions. Each step is matched by pattern, invoked with
//! its captured arguments and fixtures, and recorded as passed, failed or
//! skipped. A run can be exported as a cucumber-style JSON document.
//!
//! # Examples
//!
//! ```
//! use pickle_bdd::{Feature, Pickle, ReportConfig, Session, StepRegistry};
//!
//! let mut builder = StepRegistry::builder();
//! builder
//!     .given("a basket with {count:u32} apples", |ctx| {
//!         let count: u32 = ctx.parse_arg("count")?;
//!         assert_eq!(count, 3);
//!         Ok::<(), pickle_bdd::StepError>(())
//!     })
//!     .expect("pattern should compile");
//! let registry = builder.build();
//!
//! let feature = Feature::new("features/basket.feature")
//!     .with_name("Basket")
//!     .with_scenario(
//!         Pickle::new("Counting", 3).with_step("Given", "a basket with 3 apples", 4),
//!     );
//!
//! let mut session = Session::new(&ReportConfig::new(), &registry);
//! let outcomes = session.run_feature(&feature);
//! assert!(outcomes.iter().all(|outcome| outcome.passed()));
//! ```

pub mod config;
mod context;
mod error;
pub mod events;
pub mod execution;
pub mod matcher;
pub mod model;
mod panic;
mod pattern;
pub mod registry;
pub mod reporting;
mod session;
pub mod state;

pub use config::{ProcessRole, ReportConfig};
pub use context::{FixtureProvider, Fixtures, StepArgs, StepContext};
pub use error::{ConfigError, FixtureError, ModelError, ReportError, StepError};
pub use events::{Listeners, RunListener, ScenarioEvent, StepEvent};
pub use execution::{
    IntoStepOutcome, ScenarioError, ScenarioOutcome, ScenarioRunner, ScenarioState,
    StepExecution, StepResult, StepState, StepStatus,
};
pub use matcher::{MatchError, StepMatch, StepMatcher};
pub use model::{DataTable, Feature, Pickle, PickleStep, StepArgument, Tag};
pub use panic::panic_message;
pub use pattern::{StepPattern, StepPatternError};
pub use pickle_bdd_patterns::{SpecificityScore, StepKeyword, StepKeywordParseError};
pub use registry::{RegistryBuilder, RegistryError, ScopePath, StepDefinition, StepRegistry};
pub use reporting::CucumberJsonAggregator;
pub use session::{RunSummary, Session};
pub use state::Slot;
