//! Public API behaviour of the pattern engine.
#![expect(clippy::expect_used, reason = "tests assert the happy path")]

use pickle_bdd_patterns::{
    PatternError, PlaceholderFault, SpecificityScore, StepKeyword, compile_regex_from_pattern,
    extract_named_values, get_type_pattern, literal_text,
};
use rstest::rstest;

#[rstest]
#[case("I have {count:u32} cukes", "I have 12 cukes", &[("count", "12")])]
#[case(
    "{user} buys {n:d} {item:w}",
    "Ana buys -3 pears",
    &[("user", "Ana"), ("n", "-3"), ("item", "pears")]
)]
#[case("the path is {path:S}", "the path is /tmp/x", &[("path", "/tmp/x")])]
#[case("a {{literal}} step", "a {literal} step", &[])]
fn compiled_patterns_capture_named_values(
    #[case] pattern: &str,
    #[case] text: &str,
    #[case] expected: &[(&str, &str)],
) {
    let regex = compile_regex_from_pattern(pattern).expect("pattern should compile");
    let values = extract_named_values(&regex, text).expect("text should match");
    let expected: Vec<_> = expected
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    assert_eq!(values, expected);
}

#[rstest]
#[case("I have {count:u32} cukes", "I have many cukes")]
#[case("I have {count:u32} cukes", "I have 12 cukes today")]
#[case("exactly this", "exactly this and more")]
fn anchored_patterns_reject_partial_text(#[case] pattern: &str, #[case] text: &str) {
    let regex = compile_regex_from_pattern(pattern).expect("pattern should compile");
    assert!(extract_named_values(&regex, text).is_none());
}

#[test]
fn exposes_placeholder_error_details() {
    let Err(err) = compile_regex_from_pattern("{value:}") else {
        panic!("expected placeholder error");
    };
    let PatternError::Placeholder(info) = err else {
        panic!("expected placeholder error, got {err}");
    };
    assert_eq!(info.fault, PlaceholderFault::Invalid);
    assert_eq!(info.placeholder.as_deref(), Some("value"));
    assert_eq!(info.position, 0);
}

#[test]
fn unknown_hints_match_lazily() {
    assert_eq!(get_type_pattern(Some("Custom")), r".+?");
    let regex = compile_regex_from_pattern("{a:Custom} {b}").expect("pattern should compile");
    let values = extract_named_values(&regex, "x y z").expect("text should match");
    assert_eq!(values.first().map(|(_, v)| v.as_str()), Some("x"));
}

#[test]
fn literal_patterns_expose_their_text() {
    assert_eq!(
        literal_text(r"a \{b\} c").expect("valid pattern").as_deref(),
        Some("a {b} c")
    );
}

#[test]
fn ranks_literal_heavy_patterns_first() {
    let mut patterns = vec!["{a} {b}", "the {a} is red", "the {a} is {b}"];
    patterns.sort_by_key(|p| {
        std::cmp::Reverse(SpecificityScore::calculate(p).expect("valid pattern"))
    });
    assert_eq!(patterns, vec!["the {a} is red", "the {a} is {b}", "{a} {b}"]);
}

#[test]
fn keyword_resolution_follows_conjunctions() {
    let kw: StepKeyword = "But".parse().expect("keyword should parse");
    assert_eq!(kw.resolve(Some(StepKeyword::Then)), StepKeyword::Then);
}
