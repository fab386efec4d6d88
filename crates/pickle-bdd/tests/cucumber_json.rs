//! Behavioural tests for the cucumber JSON report across process roles.

use std::sync::{Arc, Mutex, PoisonError};

use camino::{Utf8Path, Utf8PathBuf};
use pickle_bdd::reporting::cucumber::FeatureNode;
use pickle_bdd::{
    Feature, Pickle, ProcessRole, ReportConfig, RunListener, ScenarioEvent, Session, StepError,
    StepRegistry, StepStatus,
};
use rstest::{fixture, rstest};
use tempfile::TempDir;

struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    fn report(&self) -> Utf8PathBuf {
        self.root.join("out/cucumber.json")
    }
}

#[fixture]
fn workspace() -> Workspace {
    let Ok(dir) = TempDir::new() else {
        panic!("temporary directory should be available");
    };
    let Ok(root) = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()) else {
        panic!("temporary directory should be UTF-8");
    };
    Workspace { _dir: dir, root }
}

#[expect(clippy::expect_used, reason = "step patterns are fixed")]
fn light_registry() -> StepRegistry {
    let mut builder = StepRegistry::builder();
    builder
        .given("the light is {state}", |ctx| ctx.arg("state").map(|_| ()))
        .expect("valid pattern")
        .then("it glows", |_ctx| ())
        .expect("valid pattern")
        .then("it is dark", |_ctx| Err::<(), _>(StepError::failed("still glowing")))
        .expect("valid pattern");
    builder.build()
}

fn lamp() -> Feature {
    Feature::new("features/Front Lamp.feature")
        .with_line(2)
        .with_tag("lighting", 1)
        .with_scenario(
            Pickle::new("on", 4)
                .with_tag("@fast", 3)
                .with_step("Given", "the light is on", 5)
                .with_step("Then", "it glows", 6),
        )
        .with_scenario(
            Pickle::new("off", 8)
                .with_step("Given", "the light is off", 9)
                .with_step("Then", "it is dark", 10)
                .with_step("And", "it glows", 11),
        )
        .with_scenario(Pickle::new("placeholder", 13))
}

fn read_report(path: &Utf8Path) -> Vec<FeatureNode> {
    let text = std::fs::read_to_string(path)
        .unwrap_or_else(|err| panic!("report should exist at {path}: {err}"));
    serde_json::from_str(&text).unwrap_or_else(|err| panic!("report should parse: {err}"))
}

#[rstest]
fn coordinator_reports_every_scenario_with_steps(workspace: Workspace) {
    let registry = light_registry();
    let config = ReportConfig::new().with_cucumber_json(workspace.report());
    let mut session = Session::new(&config, &registry);
    session.run_feature(&lamp());
    session.run_feature(&Feature::new("features/empty.feature"));
    let Ok(summary) = session.finish() else {
        panic!("report should be written");
    };
    assert_eq!(summary.total(), 3);

    let document = read_report(&workspace.report());
    let [feature] = document.as_slice() else {
        panic!("expected only the lamp feature, got {}", document.len());
    };
    assert_eq!(feature.id, "features/front-lamp.feature");
    assert_eq!(feature.name, "features/Front Lamp.feature");
    assert_eq!(
        feature
            .tags
            .iter()
            .map(|tag| (tag.name.as_str(), tag.line))
            .collect::<Vec<_>>(),
        vec![("@lighting", 1)]
    );

    let names: Vec<_> = feature.elements.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["on", "off"]);
    let Some(off) = feature.elements.get(1) else {
        panic!("off scenario should be reported");
    };
    assert_eq!(off.kind, "scenario");
    assert_eq!(
        off.steps.iter().map(|s| s.result.status).collect::<Vec<_>>(),
        vec![StepStatus::Passed, StepStatus::Failed, StepStatus::Skipped]
    );
    let Some(failure) = off.steps.get(1).and_then(|s| s.result.error_message.as_deref()) else {
        panic!("failed step should carry a message");
    };
    assert!(failure.contains("still glowing"), "{failure}");
    assert!(off.steps.get(2).is_some_and(|s| s.result.duration == 0));
}

#[rstest]
fn worker_never_writes_a_report(workspace: Workspace) {
    let registry = light_registry();
    let config = ReportConfig::new()
        .with_cucumber_json(workspace.report())
        .with_role(ProcessRole::Worker);
    let mut session = Session::new(&config, &registry);
    assert!(!session.has_aggregator());
    session.run_feature(&lamp());
    let Ok(summary) = session.finish() else {
        panic!("worker sessions finish cleanly");
    };
    assert_eq!((summary.passed, summary.failed), (1, 1));
    assert_eq!(summary.report, None);
    assert!(!workspace.report().exists());
}

#[rstest]
fn environment_selects_the_report_path(workspace: Workspace) {
    let root = workspace.root.clone();
    let lookup = move |name: &str| match name {
        "PICKLE_BDD_CUCUMBER_JSON" => Some("$OUT/run.json".to_string()),
        "OUT" => Some(root.join("env").into_string()),
        _ => None,
    };
    let Ok(config) = ReportConfig::from_lookup(lookup, Utf8Path::new("/unused")) else {
        panic!("configuration should load");
    };
    let expected = workspace.root.join("env/run.json");
    assert_eq!(config.cucumber_json(), Some(expected.as_path()));

    let registry = light_registry();
    let mut session = Session::new(&config, &registry);
    session.run_feature(&lamp());
    let Ok(summary) = session.finish() else {
        panic!("report should be written");
    };
    assert_eq!(summary.report, Some(expected.clone()));
    assert_eq!(read_report(&expected).len(), 1);
}

struct Finished(Arc<Mutex<Vec<String>>>);

impl RunListener for Finished {
    fn on_scenario_finished(&mut self, event: &ScenarioEvent<'_>) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.outcome.test_id.clone());
    }
}

#[test]
fn extra_listeners_observe_scenarios_without_a_report() {
    let registry = light_registry();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut session = Session::new(&ReportConfig::new(), &registry)
        .with_listener(Box::new(Finished(Arc::clone(&seen))));
    let outcomes = session.run_feature(&lamp());
    assert_eq!(outcomes.len(), 3);
    assert!(session.aggregator().is_none());
    assert_eq!(session.summary().passed, 2);
    assert_eq!(
        *seen.lock().unwrap_or_else(PoisonError::into_inner),
        vec![
            "features/Front Lamp.feature-features/Front Lamp.feature-on",
            "features/Front Lamp.feature-features/Front Lamp.feature-off",
            "features/Front Lamp.feature-features/Front Lamp.feature-placeholder",
        ]
    );
}
