//! Unit tests for candidate ranking.

use super::*;
use rstest::{fixture, rstest};

#[expect(clippy::expect_used, reason = "tests use known-good patterns")]
fn def(keyword: StepKeyword, pattern: &str) -> StepDefinition {
    StepDefinition::new(keyword, pattern, |_ctx| ()).expect("pattern should compile")
}

#[expect(clippy::expect_used, reason = "tests use known-good scopes")]
fn scope(path: &str) -> ScopePath {
    ScopePath::parse(path).expect("scope should parse")
}

fn registry_with(patterns: &[(&str, StepKeyword, &str)]) -> StepRegistry {
    let mut builder = StepRegistry::builder();
    for (layer, keyword, pattern) in patterns {
        builder.add_scoped(&scope(layer), def(*keyword, pattern));
    }
    builder.build()
}

#[fixture]
fn fruit() -> StepRegistry {
    registry_with(&[
        ("", StepKeyword::Given, "I have {count:u32} apples"),
        ("", StepKeyword::Given, "I have {what} apples"),
        ("", StepKeyword::Given, "I have 3 apples"),
        ("", StepKeyword::When, "I eat {n} apples"),
        ("", StepKeyword::Then, "I have {left} left"),
    ])
}

fn matched_pattern(result: &Result<StepMatch, MatchError>) -> Option<&str> {
    result
        .as_ref()
        .ok()
        .map(|m| m.definition.pattern().as_str())
}

#[rstest]
#[case("Given", None, StepKeyword::Given)]
#[case("And", Some(StepKeyword::When), StepKeyword::When)]
#[case("But", Some(StepKeyword::Then), StepKeyword::Then)]
#[case("*", Some(StepKeyword::When), StepKeyword::When)]
#[case("And", None, StepKeyword::Given)]
#[case("Whenever", Some(StepKeyword::Then), StepKeyword::Then)]
fn keywords_resolve_through_conjunctions(
    #[case] keyword: &str,
    #[case] previous: Option<StepKeyword>,
    #[case] expected: StepKeyword,
) {
    let step = PickleStep::new(keyword, "x", 1);
    assert_eq!(effective_keyword(&step, previous), expected);
}

#[rstest]
fn exact_literal_beats_parameterized(fruit: StepRegistry) {
    let matcher = StepMatcher::new(&fruit);
    let step = PickleStep::new("Given", "I have 3 apples", 2);
    let result = matcher.match_step(&ScopePath::root(), &step, None);
    assert_eq!(matched_pattern(&result), Some("I have 3 apples"));
}

#[rstest]
fn typed_placeholder_beats_untyped(fruit: StepRegistry) {
    let matcher = StepMatcher::new(&fruit);
    let step = PickleStep::new("Given", "I have 7 apples", 2);
    let result = matcher.match_step(&ScopePath::root(), &step, None);
    assert_eq!(matched_pattern(&result), Some("I have {count:u32} apples"));
    let Ok(bound) = result else {
        panic!("step should match");
    };
    assert_eq!(bound.args.get("count"), Some("7"));
    assert_eq!(bound.keyword, StepKeyword::Given);
}

#[rstest]
fn conjunction_matches_under_previous_keyword(fruit: StepRegistry) {
    let matcher = StepMatcher::new(&fruit);
    let step = PickleStep::new("And", "I have 2 left", 4);
    let result = matcher.match_step(&ScopePath::root(), &step, Some(StepKeyword::Then));
    assert_eq!(matched_pattern(&result), Some("I have {left} left"));
    let under_given = matcher.match_step(&ScopePath::root(), &step, Some(StepKeyword::Given));
    assert!(matches!(under_given, Err(MatchError::NotFound { keyword: StepKeyword::Given, .. })));
}

#[rstest]
fn unmatched_step_names_its_text(fruit: StepRegistry) {
    let matcher = StepMatcher::new(&fruit);
    let step = PickleStep::new("When", "I juggle", 3);
    let Err(err) = matcher.match_step(&ScopePath::root(), &step, None) else {
        panic!("step should not match");
    };
    assert_eq!(
        err,
        MatchError::NotFound {
            keyword: StepKeyword::When,
            text: "I juggle".into()
        }
    );
    assert!(err.to_string().contains("I juggle"));
}

#[test]
fn equally_specific_patterns_are_ambiguous() {
    let registry = registry_with(&[
        ("", StepKeyword::Given, "a {colour} car"),
        ("", StepKeyword::Given, "a {shade} car"),
    ]);
    let matcher = StepMatcher::new(&registry);
    let step = PickleStep::new("Given", "a red car", 1);
    let Err(MatchError::Ambiguous { candidates, .. }) =
        matcher.match_step(&ScopePath::root(), &step, None)
    else {
        panic!("expected ambiguity");
    };
    assert_eq!(candidates, vec!["a {colour} car", "a {shade} car"]);
}

#[test]
fn ambiguity_message_lists_every_candidate() {
    let err = MatchError::Ambiguous {
        keyword: StepKeyword::Given,
        text: "a red car".into(),
        candidates: vec!["a {colour} car".into(), "a {shade} car".into()],
    };
    assert_eq!(
        err.to_string(),
        "step Given 'a red car' is ambiguous; candidates: 'a {colour} car', 'a {shade} car'"
    );
}

#[test]
fn narrower_scope_masks_broader_candidates() {
    let registry = registry_with(&[
        ("", StepKeyword::Given, "a {thing} car"),
        ("", StepKeyword::Given, "a red car"),
        ("garage", StepKeyword::Given, "a {colour} car"),
    ]);
    let matcher = StepMatcher::new(&registry);
    let step = PickleStep::new("Given", "a red car", 1);

    let inner = matcher.match_step(&scope("garage::bay"), &step, None);
    let Ok(bound) = &inner else {
        panic!("step should match in the garage scope");
    };
    assert_eq!(bound.definition.scope(), &scope("garage"));
    assert_eq!(bound.args.get("colour"), Some("red"));

    let outer = matcher.match_step(&ScopePath::root(), &step, None);
    assert_eq!(matched_pattern(&outer), Some("a red car"));
}

#[test]
fn same_pattern_in_narrower_scope_wins() {
    let registry = registry_with(&[
        ("", StepKeyword::When, "I press {button}"),
        ("ui", StepKeyword::When, "I press {button}"),
    ]);
    let matcher = StepMatcher::new(&registry);
    let step = PickleStep::new("When", "I press start", 5);
    let Ok(bound) = matcher.match_step(&scope("ui"), &step, None) else {
        panic!("step should match");
    };
    assert_eq!(bound.definition.scope(), &scope("ui"));
}

#[test]
fn identical_exact_literals_resolve_to_last_registration() {
    let mut builder = StepRegistry::builder();
    builder
        .add(def(StepKeyword::Given, "a clean slate").requires("first"))
        .add(def(StepKeyword::Given, "a clean slate").requires("second"));
    let registry = builder.build();
    let matcher = StepMatcher::new(&registry);
    let step = PickleStep::new("Given", "a clean slate", 1);
    let Ok(bound) = matcher.match_step(&ScopePath::root(), &step, None) else {
        panic!("last registration should win without ambiguity");
    };
    assert_eq!(bound.definition.fixtures(), ["second".to_string()]);
}

#[rstest]
fn matching_is_deterministic(fruit: StepRegistry) {
    let matcher = StepMatcher::new(&fruit);
    let step = PickleStep::new("Given", "I have 9 apples", 2);
    let first = matcher.match_step(&ScopePath::root(), &step, None);
    for _ in 0..16 {
        let again = matcher.match_step(&ScopePath::root(), &step, None);
        let (Ok(a), Ok(b)) = (&first, &again) else {
            panic!("step should match");
        };
        assert!(Arc::ptr_eq(&a.definition, &b.definition));
    }
}

fn with_regex(placeholders: &[&str]) -> StepRegistry {
    let mut builder = StepRegistry::builder();
    let Ok(regex) =
        StepDefinition::regex(StepKeyword::Given, r"I have (?P<n>\d+) apples", |_ctx| ())
    else {
        panic!("regex should compile");
    };
    builder.add(regex);
    for pattern in placeholders {
        builder.add(def(StepKeyword::Given, pattern));
    }
    builder.build()
}

#[rstest]
#[case::broader_placeholder(&["I have {n}"], vec![r"I have (?P<n>\d+) apples", "I have {n}"])]
#[case::literal_heavy_placeholder(
    &["I have {n} apples"],
    vec![r"I have (?P<n>\d+) apples", "I have {n} apples"]
)]
#[case::only_best_placeholder_ties(
    &["I have {n} apples", "{who} have {n} apples"],
    vec![r"I have (?P<n>\d+) apples", "I have {n} apples"]
)]
fn regex_definitions_tie_with_placeholders(
    #[case] placeholders: &[&str],
    #[case] expected: Vec<&str>,
) {
    let registry = with_regex(placeholders);
    let step = PickleStep::new("Given", "I have 3 apples", 4);
    let result = StepMatcher::new(&registry).match_step(&ScopePath::root(), &step, None);
    let Err(MatchError::Ambiguous { candidates, .. }) = result else {
        panic!("expected ambiguity, got {:?}", matched_pattern(&result));
    };
    assert_eq!(candidates, expected);
}

#[test]
fn sole_regex_candidate_matches() {
    let registry = with_regex(&["I have {n} pears"]);
    let step = PickleStep::new("Given", "I have 3 apples", 4);
    let result = StepMatcher::new(&registry).match_step(&ScopePath::root(), &step, None);
    assert_eq!(matched_pattern(&result), Some(r"I have (?P<n>\d+) apples"));
}
