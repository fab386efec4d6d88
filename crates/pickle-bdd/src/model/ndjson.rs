//! Newline-delimited JSON transport for resolved features.

use std::io::{BufRead, Write};

use super::Feature;
use crate::ModelError;

/// Read one [`Feature`] per line. Blank lines are ignored.
///
/// # Errors
/// Returns [`ModelError::Io`] when reading fails and [`ModelError::Json`]
/// naming the one-based line when a line is not a valid feature document.
///
/// # Examples
/// ```
/// use pickle_bdd::model::read_features;
///
/// let input = "{\"uri\":\"a.feature\",\"name\":\"A\"}\n\n{\"uri\":\"b.feature\"}\n";
/// let features = read_features(input.as_bytes()).expect("valid input");
/// assert_eq!(features.len(), 2);
/// assert_eq!(features.get(1).map(|f| f.display_name()), Some("b.feature"));
/// ```
pub fn read_features<R: BufRead>(reader: R) -> Result<Vec<Feature>, ModelError> {
    let mut features = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let feature = serde_json::from_str(&line).map_err(|source| ModelError::Json {
            line: index + 1,
            source,
        })?;
        features.push(feature);
    }
    Ok(features)
}

/// Write each feature as a single JSON line.
///
/// # Errors
/// Returns [`ModelError`] when serialisation or writing fails.
pub fn write_features<W: Write>(mut writer: W, features: &[Feature]) -> Result<(), ModelError> {
    for (index, feature) in features.iter().enumerate() {
        serde_json::to_writer(&mut writer, feature).map_err(|source| ModelError::Json {
            line: index + 1,
            source,
        })?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}
