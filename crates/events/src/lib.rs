//! Strand Events - Child event streams for Strand collections.
//!
//! A remote collection reports its mutations as a stream of child events.
//! Each event names one key and, for insertions and moves, the key that
//! should now precede it. This crate defines that stream and the seams a
//! view plugs into.
//!
//! # Core Concepts
//!
//! - `ChildEvent`: Added / Changed / Removed / Moved, carrying an `Element`
//! - `PreviousKey`: The predecessor hint (`First` or `After(key)`)
//! - `EventSource`: Something a `ChildListener` can subscribe to
//! - `LocalSource`: An in-process relay that delivers events to listeners
//! - `MemoryCollection`: An in-memory ordered collection that emits the
//!   events a realtime backend would
//!
//! # Example
//!
//! ```ignore
//! use strand_events::{ChildEvent, LocalSource, PreviousKey};
//! use strand_core::{Document, Element};
//!
//! let source = LocalSource::new();
//! let id = source.subscribe(listener);
//!
//! source.emit(ChildEvent::added(Element::new("k1", Document::Null), PreviousKey::First))?;
//! source.unsubscribe(id);
//! ```

#![no_std]

extern crate alloc;

pub mod collection;
pub mod event;
pub mod local;
pub mod source;

pub use collection::{ChildOrder, MemoryCollection};
pub use event::{ChildEvent, ChildEventKind, PreviousKey};
pub use local::LocalSource;
pub use source::{ChildListener, EventSource, ListenerId, ListenerRef};
