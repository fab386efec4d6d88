//! Cucumber JSON report aggregation.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir};
use hashbrown::HashMap;
use log::{info, warn};

use super::cucumber::{FeatureNode, MatchNode, ResultNode, ScenarioNode, StepNode, TagNode};
use crate::events::{RunListener, ScenarioEvent};
use crate::execution::{ScenarioOutcome, StepResult};
use crate::model::{Feature, Pickle};
use crate::{ReportConfig, ReportError};

/// Builds the cucumber JSON document from finished scenarios and writes it
/// once.
///
/// Features appear in the order they were first reported; scenarios in the
/// order they finished. Scenarios without steps are left out.
///
/// # Examples
/// ```
/// use pickle_bdd::{CucumberJsonAggregator, ProcessRole, ReportConfig};
///
/// let config = ReportConfig::new().with_cucumber_json("/tmp/report.json");
/// assert!(CucumberJsonAggregator::create(&config).is_some());
/// assert!(CucumberJsonAggregator::create(&config.with_role(ProcessRole::Worker)).is_none());
/// assert!(CucumberJsonAggregator::create(&ReportConfig::new()).is_none());
/// ```
#[derive(Debug)]
pub struct CucumberJsonAggregator {
    path: Utf8PathBuf,
    features: Vec<FeatureNode>,
    index: HashMap<String, usize>,
    flushed: bool,
}

impl CucumberJsonAggregator {
    /// Create an aggregator when `config` calls for one.
    ///
    /// Returns `None` without a report path or on a worker.
    #[must_use]
    pub fn create(config: &ReportConfig) -> Option<Self> {
        if !config.installs_aggregator() {
            return None;
        }
        config.cucumber_json().map(Self::new)
    }

    /// Create an aggregator writing to `path`.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            path: path.into(),
            features: Vec::new(),
            index: HashMap::new(),
            flushed: false,
        }
    }

    /// Report destination.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Whether the report has been written.
    #[must_use]
    pub fn is_flushed(&self) -> bool {
        self.flushed
    }

    /// Feature nodes collected so far.
    #[must_use]
    pub fn document(&self) -> &[FeatureNode] {
        &self.features
    }

    /// Append a finished scenario to its feature's node.
    pub fn record_scenario(
        &mut self,
        feature: &Feature,
        pickle: &Pickle,
        outcome: &ScenarioOutcome,
    ) {
        if self.flushed {
            warn!(
                "scenario {} finished after the cucumber JSON report was written; not recorded",
                outcome.test_id
            );
            return;
        }
        if outcome.steps.is_empty() {
            return;
        }
        let scenario = ScenarioNode {
            keyword: "Scenario".to_string(),
            id: outcome.test_id.clone(),
            name: pickle.name.clone(),
            line: pickle.line,
            description: String::new(),
            tags: TagNode::for_element(&pickle.tags, pickle.line),
            kind: "scenario".to_string(),
            steps: outcome.steps.iter().map(step_node).collect(),
        };
        self.push_element(feature, scenario);
    }

    fn push_element(&mut self, feature: &Feature, scenario: ScenarioNode) {
        let features = &mut self.features;
        if let Some(node) = self
            .index
            .get(&feature.uri)
            .and_then(|&position| features.get_mut(position))
        {
            node.elements.push(scenario);
            return;
        }
        self.index.insert(feature.uri.clone(), features.len());
        features.push(FeatureNode {
            keyword: "Feature".to_string(),
            uri: feature.uri.clone(),
            name: feature.display_name().to_string(),
            id: feature.uri.to_lowercase().replace(' ', "-"),
            line: feature.line,
            description: feature.description.clone(),
            tags: TagNode::for_element(&feature.tags, feature.line),
            elements: vec![scenario],
        });
    }

    /// Serialise the document collected so far.
    ///
    /// # Errors
    /// Returns [`ReportError::Serialize`] when serialisation fails.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string(&self.features)?)
    }

    /// Write the document to the report path.
    ///
    /// The first call writes the file; later calls only return the path.
    ///
    /// # Errors
    /// Returns [`ReportError::InvalidPath`] when the path has no file name and
    /// [`ReportError::Io`] when the directory or file cannot be written.
    pub fn flush(&mut self) -> Result<&Utf8Path, ReportError> {
        if self.flushed {
            return Ok(&self.path);
        }
        let json = self.to_json()?;
        let (Some(parent), Some(file_name)) = (self.path.parent(), self.path.file_name()) else {
            return Err(ReportError::InvalidPath {
                path: self.path.clone(),
            });
        };
        let io_error = |source: std::io::Error| ReportError::Io {
            path: self.path.clone(),
            source,
        };
        let parent = if parent.as_str().is_empty() {
            Utf8Path::new(".")
        } else {
            parent
        };
        Dir::create_ambient_dir_all(parent, ambient_authority()).map_err(io_error)?;
        let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(io_error)?;
        dir.write(file_name, json).map_err(io_error)?;
        self.flushed = true;
        info!("generated json file: {}", self.path);
        Ok(&self.path)
    }
}

impl RunListener for CucumberJsonAggregator {
    fn on_scenario_finished(&mut self, event: &ScenarioEvent<'_>) {
        self.record_scenario(event.feature, event.pickle, event.outcome);
    }
}

fn step_node(result: &StepResult) -> StepNode {
    StepNode {
        keyword: result.keyword.clone(),
        name: result.text.clone(),
        line: result.line,
        matched: MatchNode::default(),
        result: ResultNode {
            status: result.status,
            error_message: result.error.clone(),
            duration: u64::try_from(result.duration.as_nanos()).unwrap_or(u64::MAX),
        },
    }
}
