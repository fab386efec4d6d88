//! Pickle model: resolved features, scenarios and steps.
//!
//! A [`Feature`] owns an ordered list of [`Pickle`]s. Each pickle is a fully
//! resolved scenario: background steps are already prepended, outline rows are
//! already substituted, and tags are already inherited. The types are
//! immutable once built and serialise to camel-cased JSON so a document
//! parser in another process can hand them over line by line (see
//! [`read_features`]).

pub mod gherkin;
mod ndjson;
mod table;

use serde::{Deserialize, Serialize};

use crate::StepKeyword;

pub use ndjson::{read_features, write_features};
pub use table::DataTable;

/// A tag attached to a feature or scenario, with its source line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    /// Tag text including the leading `@`.
    pub name: String,
    /// One-based source line of the tag.
    pub line: u32,
}

impl Tag {
    /// Create a tag, adding the leading `@` when it is missing.
    ///
    /// # Examples
    /// ```
    /// use pickle_bdd::Tag;
    ///
    /// assert_eq!(Tag::new("smoke", 2).name, "@smoke");
    /// assert_eq!(Tag::new("@smoke", 2).name, "@smoke");
    /// ```
    #[must_use]
    pub fn new(name: &str, line: u32) -> Self {
        let name = if name.starts_with('@') {
            name.to_string()
        } else {
            format!("@{name}")
        };
        Self { name, line }
    }
}

/// A resolved feature document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    /// Location of the document, relative to the project root.
    pub uri: String,
    /// Declared feature name; may be empty.
    #[serde(default)]
    pub name: String,
    /// Free-form description below the feature line.
    #[serde(default)]
    pub description: String,
    /// One-based line of the `Feature:` keyword.
    #[serde(default)]
    pub line: u32,
    /// Tags declared on the feature.
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// Resolved scenarios in document order.
    #[serde(default)]
    pub scenarios: Vec<Pickle>,
}

impl Feature {
    /// Create an empty feature located at `uri`.
    #[must_use]
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            line: 1,
            ..Self::default()
        }
    }

    /// Set the declared name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the source line of the feature keyword.
    #[must_use]
    pub fn with_line(mut self, line: u32) -> Self {
        self.line = line;
        self
    }

    /// Append a tag.
    #[must_use]
    pub fn with_tag(mut self, name: &str, line: u32) -> Self {
        self.tags.push(Tag::new(name, line));
        self
    }

    /// Append a scenario.
    #[must_use]
    pub fn with_scenario(mut self, pickle: Pickle) -> Self {
        self.scenarios.push(pickle);
        self
    }

    /// Name used in reports: the declared name, or the uri when none is set.
    ///
    /// # Examples
    /// ```
    /// use pickle_bdd::Feature;
    ///
    /// assert_eq!(Feature::new("a.feature").display_name(), "a.feature");
    /// assert_eq!(Feature::new("a.feature").with_name("A").display_name(), "A");
    /// ```
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.uri
        } else {
            &self.name
        }
    }
}

/// A fully resolved scenario.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pickle {
    /// Scenario name.
    pub name: String,
    /// One-based line of the scenario keyword.
    pub line: u32,
    /// Tags inherited from the feature, rule, scenario and examples block.
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// Steps in execution order.
    #[serde(default)]
    pub steps: Vec<PickleStep>,
    /// Distinguishes outline expansions, e.g. `[3-apples]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breadcrumb: Option<String>,
}

impl Pickle {
    /// Create a scenario without steps.
    #[must_use]
    pub fn new(name: impl Into<String>, line: u32) -> Self {
        Self {
            name: name.into(),
            line,
            ..Self::default()
        }
    }

    /// Append a step without arguments.
    #[must_use]
    pub fn with_step(self, keyword: &str, text: &str, line: u32) -> Self {
        self.with_pickle_step(PickleStep::new(keyword, text, line))
    }

    /// Append a prepared step.
    #[must_use]
    pub fn with_pickle_step(mut self, step: PickleStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Append a tag.
    #[must_use]
    pub fn with_tag(mut self, name: &str, line: u32) -> Self {
        self.tags.push(Tag::new(name, line));
        self
    }

    /// Set the outline breadcrumb.
    #[must_use]
    pub fn with_breadcrumb(mut self, breadcrumb: impl Into<String>) -> Self {
        self.breadcrumb = Some(breadcrumb.into());
        self
    }

    /// Whether the pickle carries `tag` (with or without the leading `@`).
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        let wanted = tag.trim_start_matches('@');
        self.tags
            .iter()
            .any(|t| t.name.trim_start_matches('@') == wanted)
    }

    /// Stable identifier of this test case within `feature`.
    ///
    /// # Examples
    /// ```
    /// use pickle_bdd::{Feature, Pickle};
    ///
    /// let feature = Feature::new("shop.feature").with_name("Shop");
    /// let pickle = Pickle::new("Buy", 3).with_breadcrumb("[2-pears]");
    /// assert_eq!(pickle.test_id(&feature), "shop.feature-Shop-Buy[2-pears]");
    /// ```
    #[must_use]
    pub fn test_id(&self, feature: &Feature) -> String {
        format!(
            "{}-{}-{}{}",
            feature.uri,
            feature.display_name(),
            self.name,
            self.breadcrumb.as_deref().unwrap_or_default()
        )
    }
}

/// A single step of a pickle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickleStep {
    /// Keyword as written in the document, e.g. `And`.
    pub keyword: String,
    /// Step text after the keyword.
    pub text: String,
    /// One-based source line.
    pub line: u32,
    /// Attached data table or doc string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argument: Option<StepArgument>,
}

impl PickleStep {
    /// Create a step without arguments. The keyword is trimmed.
    #[must_use]
    pub fn new(keyword: &str, text: &str, line: u32) -> Self {
        Self {
            keyword: keyword.trim().to_string(),
            text: text.to_string(),
            line,
            argument: None,
        }
    }

    /// Attach a data table.
    #[must_use]
    pub fn with_table(mut self, table: DataTable) -> Self {
        self.argument = Some(StepArgument::DataTable(table));
        self
    }

    /// Attach a doc string.
    #[must_use]
    pub fn with_docstring(mut self, docstring: impl Into<String>) -> Self {
        self.argument = Some(StepArgument::DocString(docstring.into()));
        self
    }

    /// Parsed keyword, or `None` for keywords outside `Given/When/Then/And/But/*`.
    #[must_use]
    pub fn step_keyword(&self) -> Option<StepKeyword> {
        self.keyword.parse().ok()
    }

    /// The attached data table, if any.
    #[must_use]
    pub fn datatable(&self) -> Option<&DataTable> {
        match &self.argument {
            Some(StepArgument::DataTable(table)) => Some(table),
            _ => None,
        }
    }

    /// The attached doc string, if any.
    #[must_use]
    pub fn docstring(&self) -> Option<&str> {
        match &self.argument {
            Some(StepArgument::DocString(text)) => Some(text),
            _ => None,
        }
    }
}

/// Data attached below a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StepArgument {
    /// A pipe-delimited table.
    DataTable(DataTable),
    /// A triple-quoted block of text.
    DocString(String),
}
