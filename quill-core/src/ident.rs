use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// Error produced when parsing or extending a namespace path.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentError {
    #[error("namespace path is empty")]
    Empty,

    #[error("`{0}` is not a valid namespace segment")]
    InvalidSegment(String),
}

/// A dotted namespace identifier such as `Game.Combat`.
///
/// Every segment is a plain identifier: letters, digits, and underscores,
/// not starting with a digit. Paths are immutable once parsed; the
/// extension methods return new values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NamespacePath(String);

impl NamespacePath {
    /// Parse a dotted path, validating each segment.
    pub fn parse(raw: &str) -> Result<Self, IdentError> {
        if raw.is_empty() {
            return Err(IdentError::Empty);
        }
        for segment in raw.split('.') {
            if !is_identifier(segment) {
                return Err(IdentError::InvalidSegment(segment.to_string()));
            }
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// The first (root-most) segment.
    pub fn root_segment(&self) -> &str {
        self.0.split('.').next().unwrap_or(&self.0)
    }

    /// Append a child segment: `A.B` extended with `C` is `A.B.C`.
    pub fn child(&self, segment: &str) -> Result<Self, IdentError> {
        if !is_identifier(segment) {
            return Err(IdentError::InvalidSegment(segment.to_string()));
        }
        Ok(Self(format!("{}.{}", self.0, segment)))
    }

    /// Insert a segment directly after the root segment.
    ///
    /// This is the namespace shape used for platform sibling modules:
    /// the `Editor` sibling of `A.B` is `A.Editor.B`, not `A.B.Editor`,
    /// and the sibling of a single-segment `A` is `A.Editor`.
    pub fn insert_after_root(&self, segment: &str) -> Result<Self, IdentError> {
        if !is_identifier(segment) {
            return Err(IdentError::InvalidSegment(segment.to_string()));
        }
        match self.0.split_once('.') {
            Some((root, rest)) => Ok(Self(format!("{root}.{segment}.{rest}"))),
            None => Ok(Self(format!("{}.{}", self.0, segment))),
        }
    }
}

impl fmt::Display for NamespacePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for NamespacePath {
    type Err = IdentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
