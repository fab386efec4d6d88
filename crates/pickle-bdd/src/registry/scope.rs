//! Scope paths naming registry layers.

use std::fmt;
use std::str::FromStr;

use derive_more::Deref;

use super::RegistryError;

/// A `::`-separated path naming a registry layer; the empty path is the root.
///
/// A scenario running under `checkout::payment` sees the layers
/// `checkout::payment`, `checkout` and the root, narrowest first.
///
/// # Examples
/// ```
/// use pickle_bdd::ScopePath;
///
/// let scope: ScopePath = "checkout::payment".parse().expect("valid scope");
/// let visible: Vec<String> = scope.ancestors().map(|s| s.to_string()).collect();
/// assert_eq!(visible, vec!["checkout::payment", "checkout", ""]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Deref)]
pub struct ScopePath(Vec<String>);

impl ScopePath {
    /// The root scope.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a scope path. Surrounding whitespace of each segment is ignored.
    ///
    /// # Errors
    /// Returns [`RegistryError::InvalidScope`] when a segment is empty, as in
    /// `a::::b` or `::a`.
    pub fn parse(path: &str) -> Result<Self, RegistryError> {
        let trimmed = path.trim();
        if trimmed.is_empty() {
            return Ok(Self::root());
        }
        trimmed
            .split("::")
            .map(|segment| {
                let segment = segment.trim();
                if segment.is_empty() {
                    Err(RegistryError::InvalidScope {
                        scope: path.to_string(),
                    })
                } else {
                    Ok(segment.to_string())
                }
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    /// Return the child scope named `segment`.
    #[must_use]
    pub fn join(&self, segment: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.to_string());
        Self(segments)
    }

    /// Whether this is the root scope.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The enclosing scope, or `None` at the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let (_, init) = self.0.split_last()?;
        Some(Self(init.to_vec()))
    }

    /// This scope followed by each enclosing scope, ending with the root.
    pub fn ancestors(&self) -> impl Iterator<Item = Self> + '_ {
        (0..=self.0.len())
            .rev()
            .map(|len| Self(self.0.iter().take(len).cloned().collect()))
    }
}

impl FromStr for ScopePath {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ScopePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("::"))
    }
}
