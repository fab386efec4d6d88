//! Normalising step handler return values.

use std::any::Any;
use std::fmt;

use crate::StepError;

/// Outcome produced by a step handler that did not fail.
#[derive(Debug)]
#[must_use]
pub enum StepExecution {
    /// The step passed and may hand a value to later steps.
    Continue {
        /// Value published as the definition's target fixture, if it has one.
        value: Option<Box<dyn Any + Send + Sync>>,
    },
}

impl StepExecution {
    /// Construct a successful outcome with an optional value.
    pub fn from_value(value: Option<Box<dyn Any + Send + Sync>>) -> Self {
        Self::Continue { value }
    }

    /// Construct a successful outcome carrying `value`.
    ///
    /// # Examples
    /// ```
    /// use pickle_bdd::StepExecution;
    ///
    /// let StepExecution::Continue { value } = StepExecution::with_value(42_u32);
    /// assert_eq!(value.and_then(|v| v.downcast_ref::<u32>().copied()), Some(42));
    /// ```
    pub fn with_value<T: Any + Send + Sync>(value: T) -> Self {
        Self::from_value(Some(Box::new(value)))
    }

    /// Take the carried value, if any.
    #[must_use]
    pub fn into_value(self) -> Option<Box<dyn Any + Send + Sync>> {
        match self {
            Self::Continue { value } => value,
        }
    }
}

impl Default for StepExecution {
    fn default() -> Self {
        Self::from_value(None)
    }
}

/// Conversion from a handler's return type into the runner's outcome.
///
/// Implemented for `()`, [`StepExecution`] and `Result<T, E>` where `T`
/// converts and `E` is displayable. A [`StepError`] is passed through
/// unchanged; any other error becomes [`StepError::Failed`] with its display
/// text.
pub trait IntoStepOutcome {
    /// Normalise the value.
    ///
    /// # Errors
    /// Returns the handler's failure as a [`StepError`].
    fn into_step_outcome(self) -> Result<StepExecution, StepError>;
}

impl IntoStepOutcome for () {
    fn into_step_outcome(self) -> Result<StepExecution, StepError> {
        Ok(StepExecution::default())
    }
}

impl IntoStepOutcome for StepExecution {
    fn into_step_outcome(self) -> Result<StepExecution, StepError> {
        Ok(self)
    }
}

impl<T, E> IntoStepOutcome for Result<T, E>
where
    T: IntoStepOutcome,
    E: fmt::Display + 'static,
{
    fn into_step_outcome(self) -> Result<StepExecution, StepError> {
        match self {
            Ok(value) => value.into_step_outcome(),
            Err(err) => Err((&err as &dyn Any)
                .downcast_ref::<StepError>()
                .cloned()
                .unwrap_or_else(|| StepError::failed(err.to_string()))),
        }
    }
}
