//! Named capture extraction.

use regex::Regex;

/// Extract the named capture groups when `text` matches `re`, returning `None`
/// otherwise.
///
/// Values are returned in group order as `(name, value)` pairs. Unnamed groups
/// are ignored, and named groups that did not participate in the match yield
/// empty strings.
///
/// # Examples
/// ```
/// # use regex::Regex;
/// # use pickle_bdd_patterns::extract_named_values;
/// let regex = Regex::new(r"^(?P<count>\d+) (?:big|small) (?P<fruit>\w+)$")
///     .expect("example ensures fallible call succeeds");
/// let values = extract_named_values(&regex, "3 big apples")
///     .expect("example ensures fallible call succeeds");
/// assert_eq!(
///     values,
///     vec![
///         ("count".to_string(), "3".to_string()),
///         ("fruit".to_string(), "apples".to_string()),
///     ]
/// );
/// assert!(extract_named_values(&regex, "nope").is_none());
/// ```
#[must_use]
pub fn extract_named_values(re: &Regex, text: &str) -> Option<Vec<(String, String)>> {
    let caps = re.captures(text)?;
    let values = re
        .capture_names()
        .flatten()
        .map(|name| {
            let value = caps
                .name(name)
                .map_or_else(String::new, |m| m.as_str().to_string());
            (name.to_string(), value)
        })
        .collect();
    Some(values)
}
