//! Strand Core - Core types for Strand synchronized collections.
//!
//! This crate provides the foundational types shared by the event and view
//! crates:
//!
//! - `Key`: The stable identifier of a child in a remote collection
//! - `Element`: An immutable snapshot of one child (key + document)
//! - `Document`: The structured value of a child (scalars, lists, maps)
//! - `FieldPath`: A `/`-separated path into a document
//! - `ValueType`: How a field is read when ordering by it
//! - `Error`: Error types for view and source operations
//!
//! # Example
//!
//! ```rust
//! use strand_core::{Document, Element, FieldPath};
//!
//! let element = Element::new(
//!     "alice",
//!     Document::map([
//!         ("name", Document::from("Alice")),
//!         ("stats", Document::map([("score", Document::from(42))])),
//!     ]),
//! );
//!
//! assert_eq!(element.key(), "alice");
//! let score = element.child(&FieldPath::parse("stats/score"));
//! assert_eq!(score.and_then(Document::as_i64), Some(42));
//! ```

#![no_std]

extern crate alloc;

mod document;
mod element;
mod error;
mod path;
mod types;

pub use document::{Document, DocumentMap};
pub use element::{Element, Key};
pub use error::{CancelKind, Error, Result, SourceError};
pub use path::FieldPath;
pub use types::{SortValue, ValueType};
