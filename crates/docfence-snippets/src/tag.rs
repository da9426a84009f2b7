//! Case-insensitive tag and region names.

use std::fmt;

/// A tag or region name compared case-insensitively.
///
/// Keeps the spelling it was written with so that an exact-case match can be
/// preferred over a case-insensitive one when several spans share a name.
#[derive(Debug, Clone)]
pub struct TagName {
    original: String,
    normalized: String,
}

impl TagName {
    #[must_use]
    pub fn new(name: &str) -> Self {
        let original = name.trim().to_owned();
        let normalized = original.to_lowercase();
        Self {
            original,
            normalized,
        }
    }

    /// Name as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.original
    }

    /// Lower-cased key used for matching.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.normalized
    }

    /// Case-sensitive comparison.
    #[must_use]
    pub fn is_exactly(&self, other: &Self) -> bool {
        self.original == other.original
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.original.is_empty()
    }
}

impl PartialEq for TagName {
    fn eq(&self, other: &Self) -> bool {
        self.normalized == other.normalized
    }
}

impl Eq for TagName {}

impl std::hash::Hash for TagName {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.normalized.hash(state);
    }
}

impl From<&str> for TagName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for TagName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}
