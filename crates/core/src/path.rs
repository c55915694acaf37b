//! Field paths into element documents.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

/// A `/`-separated path to a nested field, e.g. `stats/score`.
///
/// Empty segments are dropped, so `a//b` and `/a/b/` both resolve to `a/b`.
/// The empty path addresses the document itself.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Parses a path, normalizing away empty segments.
    pub fn parse(path: &str) -> Self {
        Self {
            segments: path
                .split('/')
                .filter(|s| !s.is_empty())
                .map(ToString::to_string)
                .collect(),
        }
    }

    /// Returns the empty path.
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns true if this is the empty path.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the path segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }

    /// Returns a new path with `segment` appended.
    pub fn child(&self, segment: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(
            segment
                .split('/')
                .filter(|s| !s.is_empty())
                .map(ToString::to_string),
        );
        Self { segments }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl From<&str> for FieldPath {
    fn from(v: &str) -> Self {
        FieldPath::parse(v)
    }
}

impl From<String> for FieldPath {
    fn from(v: String) -> Self {
        FieldPath::parse(&v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_parse_normalizes() {
        let path = FieldPath::parse("/a//b/");
        assert_eq!(path.segments().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(path, FieldPath::parse("a/b"));
        assert_eq!(path.to_string(), "a/b");
    }

    #[test]
    fn test_root() {
        let root = FieldPath::parse("");
        assert!(root.is_root());
        assert_eq!(root, FieldPath::root());
        assert_eq!(root.to_string(), "/");
    }

    #[test]
    fn test_child() {
        let path = FieldPath::parse("stats").child("score");
        assert_eq!(path, FieldPath::parse("stats/score"));
    }
}
