//! Document type definitions for Strand elements.
//!
//! A `Document` is the structured value stored under one key of the remote
//! collection: a scalar, a list, or a map of named fields.

use crate::path::FieldPath;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

/// A structured value stored under one key of the remote collection.
#[derive(Clone, Debug, Default)]
pub enum Document {
    /// Absent / null value
    #[default]
    Null,
    /// Boolean value
    Bool(bool),
    /// Integral number
    Int(i64),
    /// Floating point number
    Float(f64),
    /// UTF-8 string
    String(String),
    /// Ordered list of documents
    List(Vec<Document>),
    /// Map of named fields
    Map(DocumentMap),
}

/// The fields of a map document.
///
/// Built once from name / value pairs and never edited afterwards: elements
/// are replaced wholesale, so a new snapshot builds a new table. Names are
/// kept sorted so ordering and filter reads can binary search them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DocumentMap {
    fields: Vec<(String, Document)>,
}

impl DocumentMap {
    /// Returns the value of field `name`.
    pub fn get(&self, name: &str) -> Option<&Document> {
        self.fields
            .binary_search_by(|(field, _)| field.as_str().cmp(name))
            .ok()
            .map(|idx| &self.fields[idx].1)
    }
}

/// A name given more than once keeps its last value, like repeated writes
/// to the same field.
impl<K, V> FromIterator<(K, V)> for DocumentMap
where
    K: Into<String>,
    V: Into<Document>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields: Vec<(String, Document)> = iter
            .into_iter()
            .map(|(name, value)| (name.into(), value.into()))
            .collect();
        // Stable, so repeated names stay in write order
        fields.sort_by(|a, b| a.0.cmp(&b.0));
        fields.dedup_by(|later, kept| {
            if later.0 != kept.0 {
                return false;
            }
            core::mem::swap(later, kept);
            true
        });
        Self { fields }
    }
}

impl Document {
    /// Builds a map document from field / value pairs.
    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Document>,
    {
        Document::Map(entries.into_iter().collect())
    }

    /// Returns true if this is a null value.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Document::Null)
    }

    /// Returns the boolean value if this is a Bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Document::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the number as i64 if it is integral.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Document::Int(i) => Some(*i),
            // `i64::MAX as f64` rounds up to 2^63, which is already out of range
            Document::Float(f) if *f >= i64::MIN as f64 && *f < i64::MAX as f64 => {
                let i = *f as i64;
                if (i as f64) == *f {
                    Some(i)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Returns the number as f64 if this is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Document::Int(i) => Some(*i as f64),
            Document::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns a reference to the string if this is a String.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Document::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Gets a direct child by field name (maps) or numeric index (lists).
    pub fn get(&self, segment: &str) -> Option<&Document> {
        match self {
            Document::Map(map) => map.get(segment),
            Document::List(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }
    }

    /// Resolves a nested child. The empty path resolves to `self`.
    ///
    /// A `Null` anywhere along the path counts as absent.
    pub fn child(&self, path: &FieldPath) -> Option<&Document> {
        let mut current = self;
        for segment in path.segments() {
            current = current.get(segment)?;
        }
        if current.is_null() {
            None
        } else {
            Some(current)
        }
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Document::Null, Document::Null) => true,
            (Document::Bool(a), Document::Bool(b)) => a == b,
            (Document::Int(a), Document::Int(b)) => a == b,
            (Document::Float(a), Document::Float(b)) => {
                // Handle NaN comparison
                if a.is_nan() && b.is_nan() {
                    true
                } else {
                    a == b
                }
            }
            (Document::String(a), Document::String(b)) => a == b,
            (Document::List(a), Document::List(b)) => a == b,
            (Document::Map(a), Document::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for Document {
    fn from(v: bool) -> Self {
        Document::Bool(v)
    }
}

impl From<i32> for Document {
    fn from(v: i32) -> Self {
        Document::Int(v as i64)
    }
}

impl From<i64> for Document {
    fn from(v: i64) -> Self {
        Document::Int(v)
    }
}

impl From<f64> for Document {
    fn from(v: f64) -> Self {
        Document::Float(v)
    }
}

impl From<String> for Document {
    fn from(v: String) -> Self {
        Document::String(v)
    }
}

impl From<&str> for Document {
    fn from(v: &str) -> Self {
        Document::String(v.to_string())
    }
}

impl From<Vec<Document>> for Document {
    fn from(v: Vec<Document>) -> Self {
        Document::List(v)
    }
}

impl From<DocumentMap> for Document {
    fn from(v: DocumentMap) -> Self {
        Document::Map(v)
    }
}

impl<T> From<Option<T>> for Document
where
    T: Into<Document>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Document::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_map_lookup() {
        let doc = Document::map([("zeta", 1), ("alpha", 2), ("mid", 3)]);

        assert_eq!(doc.get("alpha"), Some(&Document::Int(2)));
        assert_eq!(doc.get("mid"), Some(&Document::Int(3)));
        assert_eq!(doc.get("zeta"), Some(&Document::Int(1)));
        assert!(doc.get("nope").is_none());
    }

    #[test]
    fn test_map_repeated_name_keeps_last() {
        let doc = Document::map([("n", 1), ("m", 5), ("n", 2), ("n", 3)]);

        assert_eq!(doc.get("n"), Some(&Document::Int(3)));
        assert_eq!(doc, Document::map([("m", 5), ("n", 3)]));
    }

    #[test]
    fn test_number_accessors() {
        assert_eq!(Document::Int(7).as_i64(), Some(7));
        assert_eq!(Document::Float(7.0).as_i64(), Some(7));
        assert_eq!(Document::Float(7.5).as_i64(), None);
        assert_eq!(Document::Int(7).as_f64(), Some(7.0));
        assert_eq!(Document::from("7").as_i64(), None);
    }

    #[test]
    fn test_float_outside_i64_is_not_integral() {
        assert_eq!(Document::Float(9.223372036854775808e18).as_i64(), None);
        assert_eq!(Document::Float(-1e19).as_i64(), None);
        assert_eq!(Document::Float(f64::INFINITY).as_i64(), None);
        assert_eq!(Document::Float(f64::NAN).as_i64(), None);
        assert_eq!(
            Document::Float(-9.223372036854775808e18).as_i64(),
            Some(i64::MIN)
        );
    }

    #[test]
    fn test_nested_child() {
        let doc = Document::map([
            ("stats", Document::map([("score", Document::from(10))])),
            ("tags", Document::from(vec![Document::from("a"), Document::from("b")])),
        ]);

        assert_eq!(
            doc.child(&FieldPath::parse("stats/score")),
            Some(&Document::Int(10))
        );
        assert_eq!(
            doc.child(&FieldPath::parse("tags/1")),
            Some(&Document::from("b"))
        );
        assert!(doc.child(&FieldPath::parse("stats/missing")).is_none());
        assert!(doc.child(&FieldPath::parse("tags/x")).is_none());
        assert_eq!(doc.child(&FieldPath::root()), Some(&doc));
    }

    #[test]
    fn test_null_child_is_absent() {
        let doc = Document::map([("n", Document::Null)]);
        assert!(doc.child(&FieldPath::parse("n")).is_none());
    }

    #[test]
    fn test_nan_equality() {
        assert_eq!(Document::Float(f64::NAN), Document::Float(f64::NAN));
        assert_ne!(Document::Int(1), Document::Float(1.0));
    }
}
