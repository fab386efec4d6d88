//! Data tables attached to steps.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// Rows of cells attached to a step. The first row is treated as the header
/// by [`header`](Self::header), [`body`](Self::body) and
/// [`to_records`](Self::to_records).
///
/// # Examples
/// ```
/// use pickle_bdd::DataTable;
///
/// let table = DataTable::new(vec![
///     vec!["name".into(), "qty".into()],
///     vec!["apple".into(), "3".into()],
/// ]);
/// assert_eq!(table.header(), Some(&["name".to_string(), "qty".to_string()][..]));
/// let records = table.to_records();
/// assert_eq!(records.first().and_then(|r| r.get("qty")).map(String::as_str), Some("3"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataTable {
    rows: Vec<Vec<String>>,
}

impl DataTable {
    /// Wrap the given rows.
    #[must_use]
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// Build a table from string slices.
    #[must_use]
    pub fn from_rows<R, S>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(
            rows.into_iter()
                .map(|row| row.into_iter().map(|c| c.as_ref().to_string()).collect())
                .collect(),
        )
    }

    /// All rows, header included.
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// The first row.
    #[must_use]
    pub fn header(&self) -> Option<&[String]> {
        self.rows.first().map(Vec::as_slice)
    }

    /// Every row after the header.
    #[must_use]
    pub fn body(&self) -> &[Vec<String>] {
        self.rows.get(1..).unwrap_or_default()
    }

    /// Whether the table has no rows at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Map every body row to a header → cell record.
    ///
    /// Cells beyond the header width are dropped and missing cells are absent
    /// from the record.
    #[must_use]
    pub fn to_records(&self) -> Vec<HashMap<String, String>> {
        let Some(header) = self.header() else {
            return Vec::new();
        };
        self.body()
            .iter()
            .map(|row| {
                header
                    .iter()
                    .zip(row)
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect()
            })
            .collect()
    }
}
