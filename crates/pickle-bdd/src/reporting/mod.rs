//! Cucumber JSON reporting.
//!
//! The [`CucumberJsonAggregator`] listens for finished scenarios and builds a
//! nested feature, scenario and step document (see [`cucumber`] for its
//! shape). It exists only in the coordinating process and writes its file once
//! when the run finishes.

mod aggregator;
pub mod cucumber;

pub use aggregator::CucumberJsonAggregator;
