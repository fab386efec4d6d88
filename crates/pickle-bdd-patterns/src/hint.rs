//! Placeholder type-hint helpers used during regex compilation.

const INTEGER: &str = r"[+-]?\d+";
const FLOAT: &str = r"(?i:(?:[+-]?(?:\d+\.\d*|\.\d+|\d+)(?:[eE][+-]?\d+)?|nan|inf|infinity))";

/// Translate a placeholder type hint into a regular-expression fragment.
///
/// Rust primitive names and the single-letter format types of `parse`-style
/// patterns are recognised; any other hint matches lazily.
///
/// # Examples
/// ```
/// use pickle_bdd_patterns::get_type_pattern;
/// assert_eq!(get_type_pattern(Some("u32")), r"\d+");
/// assert_eq!(get_type_pattern(Some("d")), r"[+-]?\d+");
/// assert_eq!(get_type_pattern(Some("w")), r"\w+");
/// assert_eq!(get_type_pattern(None), ".+?");
/// ```
#[must_use]
pub fn get_type_pattern(type_hint: Option<&str>) -> &'static str {
    match type_hint {
        Some("u8" | "u16" | "u32" | "u64" | "u128" | "usize") => r"\d+",
        Some("i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "d") => INTEGER,
        Some("f32" | "f64" | "f" | "g" | "e") => FLOAT,
        Some("w") => r"\w+",
        Some("W") => r"\W+",
        Some("S") => r"\S+",
        Some("s") => r"\s+",
        _ => r".+?",
    }
}
