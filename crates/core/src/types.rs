//! Value types used when ordering by a field.
//!
//! A `ValueType` says how a field is read for comparison. Reading a document
//! that does not fit the type yields `None`; callers treat that the same as a
//! missing field.

use crate::document::Document;
use core::cmp::Ordering;

/// The comparison semantics applied to an ordering field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// Booleans, `false` before `true`
    Boolean,
    /// Integers; integral floats are accepted
    Integer,
    /// Floating point numbers; integers are accepted
    Float,
    /// UTF-8 strings, compared bytewise
    String,
}

impl ValueType {
    /// Reads `doc` as this type.
    pub fn read<'a>(&self, doc: &'a Document) -> Option<SortValue<'a>> {
        match self {
            ValueType::Boolean => doc.as_bool().map(SortValue::Bool),
            ValueType::Integer => doc.as_i64().map(SortValue::Int),
            ValueType::Float => doc.as_f64().map(SortValue::Float),
            ValueType::String => doc.as_str().map(SortValue::Str),
        }
    }

    /// Returns the type name.
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::Boolean => "boolean",
            ValueType::Integer => "integer",
            ValueType::Float => "float",
            ValueType::String => "string",
        }
    }
}

/// A field value read as a `ValueType`, ready for comparison.
#[derive(Clone, Copy, Debug)]
pub enum SortValue<'a> {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(&'a str),
}

impl PartialEq for SortValue<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortValue<'_> {}

impl PartialOrd for SortValue<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SortValue<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortValue::Bool(a), SortValue::Bool(b)) => a.cmp(b),
            (SortValue::Int(a), SortValue::Int(b)) => a.cmp(b),
            // NaN sorts after every other float
            (SortValue::Float(a), SortValue::Float(b)) => a.total_cmp(b),
            (SortValue::Str(a), SortValue::Str(b)) => a.cmp(b),
            // Only reachable when mixing types: order by type
            _ => self.type_order().cmp(&other.type_order()),
        }
    }
}

impl SortValue<'_> {
    fn type_order(&self) -> u8 {
        match self {
            SortValue::Bool(_) => 0,
            SortValue::Int(_) => 1,
            SortValue::Float(_) => 2,
            SortValue::Str(_) => 3,
        }
    }
}
