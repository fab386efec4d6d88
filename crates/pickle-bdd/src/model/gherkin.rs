//! Conversion from parsed Gherkin documents into pickles.
//!
//! Backgrounds are prepended to every scenario they cover, rules are
//! flattened into the feature, and each examples row of an outline becomes
//! its own [`Pickle`] with `<column>` references substituted.

use camino::Utf8Path;
use cap_std::{ambient_authority, fs_utf8::Dir};
use hashbrown::HashMap;

use super::{DataTable, Feature, Pickle, PickleStep, StepArgument, Tag};
use crate::ModelError;

/// Parse Gherkin `text` and resolve it into a [`Feature`] located at `uri`.
///
/// # Errors
/// Returns [`ModelError::Gherkin`] when the document does not parse.
///
/// # Examples
/// ```
/// use pickle_bdd::model::gherkin::parse_feature;
///
/// let text = "Feature: Basket\n  Scenario: Empty\n    Given an empty basket\n";
/// let feature = parse_feature(text, "basket.feature").expect("valid feature");
/// assert_eq!(feature.scenarios.len(), 1);
/// ```
pub fn parse_feature(text: &str, uri: &str) -> Result<Feature, ModelError> {
    let mut source = text.to_string();
    if !source.ends_with('\n') {
        source.push('\n');
    }
    let parsed = ::gherkin::Feature::parse(source.as_str(), ::gherkin::GherkinEnv::default())
        .map_err(|source| ModelError::Gherkin {
            uri: uri.to_string(),
            source,
        })?;
    Ok(from_gherkin(&parsed, uri))
}

/// Read and resolve the feature file at `path`, reporting it under `uri`.
///
/// # Errors
/// Returns [`ModelError::Io`] when the file cannot be read and
/// [`ModelError::Gherkin`] when it does not parse.
pub fn load_feature(path: &Utf8Path, uri: &str) -> Result<Feature, ModelError> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_str().is_empty() => dir,
        _ => Utf8Path::new("."),
    };
    let file_name = path.file_name().ok_or_else(|| {
        ModelError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("feature path {path} has no file name"),
        ))
    })?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority())?;
    let text = dir.read_to_string(file_name)?;
    parse_feature(&text, uri)
}

/// Resolve an already parsed Gherkin feature.
#[must_use]
pub fn from_gherkin(feature: &::gherkin::Feature, uri: &str) -> Feature {
    let feature_line = to_line(feature.position.line);
    let feature_tags = tags_above(&feature.tags, feature_line);
    let background = feature
        .background
        .as_ref()
        .map(|bg| bg.steps.as_slice())
        .unwrap_or_default();

    let mut scenarios = Vec::new();
    for scenario in &feature.scenarios {
        expand_scenario(scenario, background, &feature_tags, &mut scenarios);
    }
    for rule in &feature.rules {
        let mut steps = background.to_vec();
        if let Some(rule_bg) = rule.background.as_ref() {
            steps.extend(rule_bg.steps.iter().cloned());
        }
        let own_tags = tags_above(&rule.tags, to_line(rule.position.line));
        let rule_tags = merge_tags(&feature_tags, &own_tags);
        for scenario in &rule.scenarios {
            expand_scenario(scenario, &steps, &rule_tags, &mut scenarios);
        }
    }

    Feature {
        uri: uri.to_string(),
        name: feature.name.trim().to_string(),
        description: feature
            .description
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string(),
        line: feature_line,
        tags: feature_tags,
        scenarios,
    }
}

fn to_line(line: usize) -> u32 {
    u32::try_from(line).unwrap_or(u32::MAX)
}

/// Gherkin does not record tag positions; tags sit on the line above.
fn tags_above(tags: &[String], element_line: u32) -> Vec<Tag> {
    let line = element_line.saturating_sub(1);
    tags.iter().map(|name| Tag::new(name, line)).collect()
}

fn merge_tags(inherited: &[Tag], own: &[Tag]) -> Vec<Tag> {
    let mut merged: Vec<Tag> = Vec::with_capacity(inherited.len() + own.len());
    for tag in inherited.iter().chain(own) {
        if !merged.iter().any(|t| t.name == tag.name) {
            merged.push(tag.clone());
        }
    }
    merged
}

fn expand_scenario(
    scenario: &::gherkin::Scenario,
    background: &[::gherkin::Step],
    inherited_tags: &[Tag],
    out: &mut Vec<Pickle>,
) {
    let line = to_line(scenario.position.line);
    let tags = merge_tags(inherited_tags, &tags_above(&scenario.tags, line));
    let steps = || background.iter().chain(&scenario.steps);

    if scenario.examples.is_empty() {
        out.push(Pickle {
            name: scenario.name.trim().to_string(),
            line,
            tags,
            steps: steps().map(|step| convert_step(step, &HashMap::new())).collect(),
            breadcrumb: None,
        });
        return;
    }

    for examples in &scenario.examples {
        let Some(table) = examples.table.as_ref() else {
            continue;
        };
        let Some((header, rows)) = table.rows.split_first() else {
            continue;
        };
        let row_tags = merge_tags(
            &tags,
            &tags_above(&examples.tags, to_line(examples.position.line)),
        );
        for row in rows {
            let values: HashMap<&str, &str> = header
                .iter()
                .map(String::as_str)
                .zip(row.iter().map(String::as_str))
                .collect();
            out.push(Pickle {
                name: substitute(scenario.name.trim(), &values),
                line,
                tags: row_tags.clone(),
                steps: steps().map(|step| convert_step(step, &values)).collect(),
                breadcrumb: Some(format!("[{}]", row.join("-"))),
            });
        }
    }
}

fn convert_step(step: &::gherkin::Step, values: &HashMap<&str, &str>) -> PickleStep {
    let argument = if let Some(table) = step.table.as_ref() {
        Some(StepArgument::DataTable(DataTable::new(
            table
                .rows
                .iter()
                .map(|row| row.iter().map(|cell| substitute(cell, values)).collect())
                .collect(),
        )))
    } else {
        step.docstring
            .as_deref()
            .map(|doc| StepArgument::DocString(substitute(doc, values)))
    };
    PickleStep {
        keyword: step.keyword.trim().to_string(),
        text: substitute(&step.value, values),
        line: to_line(step.position.line),
        argument,
    }
}

/// Replace `<name>` references that name a known column. Unknown references
/// are left untouched and substituted values are never rescanned.
fn substitute(text: &str, values: &HashMap<&str, &str>) -> String {
    if values.is_empty() {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some((before, after)) = rest.split_once('<') {
        out.push_str(before);
        let replaced = after
            .split_once('>')
            .and_then(|(key, tail)| values.get(key).map(|value| (*value, tail)));
        if let Some((value, tail)) = replaced {
            out.push_str(value);
            rest = tail;
        } else {
            out.push('<');
            rest = after;
        }
    }
    out.push_str(rest);
    out
}
