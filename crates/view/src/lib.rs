//! Strand View - Ordered, observable views over child event streams.
//!
//! This crate keeps a local, indexable copy of a remote keyed collection in
//! sync with the collection's child event stream, and tells a single observer
//! exactly which indices each event touched.
//!
//! # Core Concepts
//!
//! - `OrderedView`: The synchronized sequence of visible elements
//! - `Change`: One notification (added, changed, removed, moved, all changed)
//! - `Comparator` / `Direction`: Optional sorting on top of stream order
//! - `Filter`: Optional exclusion of elements from the view
//!
//! # Example
//!
//! ```ignore
//! use strand_core::{Document, ValueType};
//! use strand_events::MemoryCollection;
//! use strand_view::{Direction, OrderedView};
//!
//! let remote = Rc::new(MemoryCollection::new());
//! let view = OrderedView::builder()
//!     .order_by("score", ValueType::Integer)
//!     .direction(Direction::Descending)
//!     .filter(|e| e.key().as_str().starts_with("bot-"))
//!     .attach(remote.clone());
//!
//! view.borrow_mut().set_observer(|change| {
//!     println!("{}", change);
//! });
//!
//! remote.set("alice", Document::map([("score", 10)]))?;
//! assert_eq!(view.borrow().item_at(0)?.key(), "alice");
//! ```

#![no_std]

extern crate alloc;

pub mod change;
pub mod filter;
pub mod observer;
pub mod ordering;
pub mod view;

pub use change::{Change, ChangeKind};
pub use filter::Filter;
pub use observer::{ChangeObserver, ObserverSlot};
pub use ordering::{stable_sort_by, CompareFn, Comparator, Direction, FieldOrdering};
pub use view::{CancelHandler, OrderedView, OrderedViewBuilder};

// Re-export commonly used types from dependencies
pub use strand_core::{Element, Error, FieldPath, Key, Result, SourceError, ValueType};
pub use strand_events::{ChildEvent, EventSource, PreviousKey};
