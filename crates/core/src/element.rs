//! Keys and element snapshots.
//!
//! An `Element` is what the remote collection hands out for one child: its
//! key and the full document stored under it. Elements are replaced wholesale
//! on every update, never patched field by field.

use crate::document::Document;
use crate::path::FieldPath;
use alloc::string::String;
use core::borrow::Borrow;
use core::fmt;

/// The stable identifier of a child in a remote collection.
///
/// Keys are the only identifiers that survive mutations; indices shift.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key(String);

impl Key {
    /// Creates a key from anything string-like.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Key {
    fn from(v: &str) -> Self {
        Key(v.into())
    }
}

impl From<String> for Key {
    fn from(v: String) -> Self {
        Key(v)
    }
}

impl From<&Key> for Key {
    fn from(v: &Key) -> Self {
        v.clone()
    }
}

impl PartialEq<str> for Key {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Key {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// An immutable snapshot of one child of the remote collection.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    key: Key,
    value: Document,
}

impl Element {
    /// Creates a new element from a key and its document.
    pub fn new(key: impl Into<Key>, value: impl Into<Document>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Returns the element key.
    #[inline]
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// Returns the element document.
    #[inline]
    pub fn value(&self) -> &Document {
        &self.value
    }

    /// Resolves a nested field of this element's document.
    pub fn child(&self, path: &FieldPath) -> Option<&Document> {
        self.value.child(path)
    }
}
