//! Step-pattern engine for pickle-bdd.
//!
//! Patterns are compiled into anchored regular expressions whose capture
//! groups are named after their placeholders. The crate also ranks competing
//! patterns by specificity and owns the [`StepKeyword`] type so the runtime
//! resolves `And`/`But` consistently.

mod capture;
mod errors;
mod hint;
mod keyword;
mod pattern;
mod specificity;

pub use capture::extract_named_values;
pub use errors::{PatternError, PlaceholderErrorInfo, PlaceholderFault};
pub use hint::get_type_pattern;
pub use keyword::{StepKeyword, StepKeywordParseError};
pub use pattern::{
    build_regex_from_pattern, compile_regex_from_pattern, literal_text, placeholder_names,
};
pub use specificity::SpecificityScore;
