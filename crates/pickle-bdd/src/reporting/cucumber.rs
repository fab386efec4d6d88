//! Cucumber JSON document nodes.
//!
//! The shape follows the cucumber JSON convention: an array of features, each
//! holding its scenarios as `elements`, each holding its steps with a `result`.
//! Nodes own their data so a finished document can be serialised after the
//! run's features and pickles are gone, and deserialised again by tools that
//! consume the report.

use serde::{Deserialize, Serialize};

use crate::StepStatus;
use crate::model::Tag;

/// A tag as it appears in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagNode {
    /// Tag text including the `@`.
    pub name: String,
    /// Line above the tagged element.
    pub line: u32,
}

impl TagNode {
    /// Tags of an element declared on `element_line`.
    ///
    /// Every tag is placed on the line above the element.
    #[must_use]
    pub fn for_element(tags: &[Tag], element_line: u32) -> Vec<Self> {
        tags.iter()
            .map(|tag| Self {
                name: tag.name.clone(),
                line: element_line.saturating_sub(1),
            })
            .collect()
    }
}

/// A feature and its reported scenarios.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureNode {
    /// Always `"Feature"`.
    pub keyword: String,
    /// Feature uri.
    pub uri: String,
    /// Declared name, or the uri when the feature has none.
    pub name: String,
    /// Lowercased uri with spaces replaced by hyphens.
    pub id: String,
    /// Line of the feature keyword.
    pub line: u32,
    /// Feature description.
    pub description: String,
    /// Feature tags.
    pub tags: Vec<TagNode>,
    /// Scenarios in completion order.
    pub elements: Vec<ScenarioNode>,
}

/// A reported scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioNode {
    /// Always `"Scenario"`.
    pub keyword: String,
    /// Stable test identifier.
    pub id: String,
    /// Scenario name.
    pub name: String,
    /// Line of the scenario keyword.
    pub line: u32,
    /// Always empty.
    pub description: String,
    /// Scenario tags.
    pub tags: Vec<TagNode>,
    /// Always `"scenario"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Steps in declared order.
    pub steps: Vec<StepNode>,
}

/// A reported step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepNode {
    /// Keyword as written.
    pub keyword: String,
    /// Step text.
    pub name: String,
    /// Line of the step.
    pub line: u32,
    /// Definition location placeholder.
    #[serde(rename = "match")]
    pub matched: MatchNode,
    /// Execution result.
    pub result: ResultNode,
}

/// Location of the matching definition; always empty in this report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchNode {
    /// Empty string.
    pub location: String,
}

/// Result of a reported step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultNode {
    /// `passed`, `failed` or `skipped`.
    pub status: StepStatus,
    /// Failure text, present only on a scenario's first failing step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Elapsed time in whole nanoseconds.
    pub duration: u64,
}
