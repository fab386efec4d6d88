//! Error types raised by step handlers and the run's ambient services.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Failure raised from inside a step.
///
/// Handlers return it directly or via `?` on the [`StepContext`] accessors;
/// the runner also produces it for panics and missing fixtures.
///
/// [`StepContext`]: crate::StepContext
///
/// # Examples
/// ```
/// use pickle_bdd::StepError;
///
/// let err = StepError::failed("the basket is empty");
/// assert_eq!(err.to_string(), "the basket is empty");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum StepError {
    /// The handler reported a failure.
    #[error("{message}")]
    Failed {
        /// Rendered failure message.
        message: String,
    },
    /// The handler panicked.
    #[error("panic in step: {message}")]
    Panic {
        /// Rendered panic payload.
        message: String,
    },
    /// The step pattern has no capture with this name.
    #[error("missing argument `{name}`")]
    MissingArgument {
        /// Requested argument name.
        name: String,
    },
    /// A captured argument could not be converted.
    #[error("invalid value {value:?} for argument `{name}`: {reason}")]
    InvalidArgument {
        /// Argument name.
        name: String,
        /// Captured text.
        value: String,
        /// Conversion error message.
        reason: String,
    },
    /// A fixture is absent or has a different type.
    #[error("missing fixture '{name}' of type '{ty}'")]
    MissingFixture {
        /// Fixture name.
        name: String,
        /// Requested Rust type.
        ty: String,
    },
    /// Fixtures declared by the definition were not provided.
    #[error(
        "step '{pattern}' requires fixtures [{}] but only [{}] are available",
        .missing.join(", "),
        .available.join(", ")
    )]
    MissingFixtures {
        /// Pattern of the definition.
        pattern: String,
        /// Declared fixtures that are absent.
        missing: Vec<String>,
        /// Fixtures present in the scenario.
        available: Vec<String>,
    },
    /// The handler asked for a data table the step does not carry.
    #[error("step has no data table")]
    MissingDataTable,
    /// The handler asked for a doc string the step does not carry.
    #[error("step has no doc string")]
    MissingDocString,
}

impl StepError {
    /// Build a [`StepError::Failed`] from any message.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }
}

/// Failure to assemble a scenario's fixtures before its first step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FixtureError {
    /// Rendered failure message.
    pub message: String,
}

impl FixtureError {
    /// Create a fixture error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors raised while loading or saving pickle documents.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ModelError {
    /// Reading or writing failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// A JSON line could not be converted.
    #[error("invalid feature document on line {line}: {source}")]
    Json {
        /// One-based line (or record) number.
        line: usize,
        /// Underlying serde error.
        source: serde_json::Error,
    },
    /// A Gherkin document failed to parse.
    #[error("failed to parse feature {uri}: {source}")]
    Gherkin {
        /// Uri the document was loaded for.
        uri: String,
        /// Underlying parser error.
        source: gherkin::ParseError,
    },
}

/// Errors raised while reading run configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The current directory is not valid UTF-8.
    #[error("current directory is not valid UTF-8: {path}")]
    NonUtf8CurrentDir {
        /// Lossy rendering of the directory.
        path: String,
    },
    /// The current directory could not be determined.
    #[error("cannot determine current directory: {message}")]
    CurrentDir {
        /// Rendered I/O error.
        message: String,
    },
}

/// Errors raised while producing the cucumber JSON report.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReportError {
    /// Writing the report file failed.
    #[error("failed to write cucumber JSON report to {path}: {source}")]
    Io {
        /// Target path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The report path does not name a file.
    #[error("cucumber JSON report path {path} has no file name")]
    InvalidPath {
        /// Offending path.
        path: Utf8PathBuf,
    },
    /// Serialising the document failed.
    #[error("failed to serialise cucumber JSON report: {0}")]
    Serialize(#[from] serde_json::Error),
}
