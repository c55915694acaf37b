//! In-memory ordered collection.
//!
//! `MemoryCollection` plays the part of the remote backend: it owns the
//! authoritative children, keeps them in query order, and emits the child
//! events (with correct predecessor hints) that a realtime service would send
//! to its subscribers.

use crate::event::{ChildEvent, PreviousKey};
use crate::local::LocalSource;
use crate::source::{EventSource, ListenerId, ListenerRef};
use alloc::vec::Vec;
use core::cell::RefCell;
use core::cmp::Ordering;
use log::warn;
use strand_core::{Document, Element, Error, FieldPath, Key, Result, SourceError};

/// How a `MemoryCollection` orders its children.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChildOrder {
    /// By key: integer keys numerically first, then other keys bytewise.
    Key,
    /// By the value at a child path, ties broken by key.
    ///
    /// Missing and null values come first, then `false`, `true`, numbers,
    /// strings, and finally lists and maps.
    Child(FieldPath),
}

/// An in-memory stand-in for a remote keyed collection.
///
/// # Example
///
/// ```ignore
/// let remote = Rc::new(MemoryCollection::ordered_by_child("score"));
/// let view = OrderedView::attach(remote.clone());
///
/// remote.set("alice", Document::map([("score", 10)]))?;
/// remote.set("bob", Document::map([("score", 5)]))?;
/// assert_eq!(view.borrow().item_at(0)?.key(), "bob");
/// ```
pub struct MemoryCollection {
    order: ChildOrder,
    /// Children in query order
    children: RefCell<Vec<Element>>,
    source: LocalSource,
}

impl Default for MemoryCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCollection {
    /// Creates an empty collection ordered by key.
    pub fn new() -> Self {
        Self::ordered_by(ChildOrder::Key)
    }

    /// Creates an empty collection ordered by the value at `path`.
    pub fn ordered_by_child(path: impl Into<FieldPath>) -> Self {
        Self::ordered_by(ChildOrder::Child(path.into()))
    }

    /// Creates an empty collection with the given ordering.
    pub fn ordered_by(order: ChildOrder) -> Self {
        Self {
            order,
            children: RefCell::new(Vec::new()),
            source: LocalSource::new(),
        }
    }

    /// Writes a child, emitting Added for a new key, or Moved (if its
    /// position changed) followed by Changed for an existing one.
    ///
    /// Fails with `SourceCancelled`, leaving the children untouched, once the
    /// collection is cancelled. Otherwise the write is applied before any
    /// listener runs and a listener error does not roll it back: every event
    /// is still emitted and the first error is returned.
    pub fn set(&self, key: impl Into<Key>, value: impl Into<Document>) -> Result<()> {
        self.ensure_open()?;
        let element = Element::new(key, value);

        let (old, index, previous) = {
            let mut children = self.children.borrow_mut();
            let old = children.iter().position(|c| c.key() == element.key());
            if let Some(old) = old {
                children.remove(old);
            }
            let index =
                children.partition_point(|c| self.compare(c, &element) == Ordering::Less);
            children.insert(index, element.clone());
            (old, index, previous_key(&children, index))
        };

        match old {
            None => self.source.emit(ChildEvent::added(element, previous)),
            Some(old) => {
                let moved = if old != index {
                    self.source
                        .emit(ChildEvent::moved(element.clone(), previous.clone()))
                } else {
                    Ok(())
                };
                let changed = self.source.emit(ChildEvent::changed(element, previous));
                moved.and(changed)
            }
        }
    }

    /// Deletes a child, emitting Removed. Returns false if the key is absent.
    ///
    /// Like `set`, fails without deleting once the collection is cancelled.
    pub fn remove(&self, key: &str) -> Result<bool> {
        self.ensure_open()?;
        let removed = {
            let mut children = self.children.borrow_mut();
            children
                .iter()
                .position(|c| c.key() == key)
                .map(|index| children.remove(index))
        };

        match removed {
            Some(element) => {
                self.source.emit(ChildEvent::removed(element))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Terminates the collection's event stream.
    pub fn cancel(&self, error: SourceError) {
        self.source.cancel(error);
    }

    /// Returns the number of children.
    pub fn len(&self) -> usize {
        self.children.borrow().len()
    }

    /// Returns true if there are no children.
    pub fn is_empty(&self) -> bool {
        self.children.borrow().is_empty()
    }

    /// Returns the keys of all children, in query order.
    pub fn keys(&self) -> Vec<Key> {
        self.children
            .borrow()
            .iter()
            .map(|c| c.key().clone())
            .collect()
    }

    /// Returns a snapshot of the child stored under `key`.
    pub fn get(&self, key: &str) -> Option<Element> {
        self.children
            .borrow()
            .iter()
            .find(|c| c.key() == key)
            .cloned()
    }

    /// Returns the number of live listeners.
    pub fn listener_count(&self) -> usize {
        self.source.listener_count()
    }

    fn ensure_open(&self) -> Result<()> {
        match self.source.cancellation() {
            Some(error) => Err(Error::source_cancelled(error)),
            None => Ok(()),
        }
    }

    fn compare(&self, a: &Element, b: &Element) -> Ordering {
        match &self.order {
            ChildOrder::Key => compare_keys(a.key().as_str(), b.key().as_str()),
            ChildOrder::Child(path) => compare_values(a.child(path), b.child(path))
                .then_with(|| compare_keys(a.key().as_str(), b.key().as_str())),
        }
    }

    /// Sends an Added event for every existing child to a new listener.
    fn replay(&self, listener: &ListenerRef) {
        let Some(listener) = listener.upgrade() else {
            return;
        };
        let children = self.children.borrow().clone();

        let mut previous = PreviousKey::First;
        for child in children {
            let key = child.key().clone();
            let result = listener
                .borrow_mut()
                .on_child_event(ChildEvent::added(child, previous));
            if let Err(err) = result {
                warn!("replaying `{}` to a new listener failed: {}", key, err);
            }
            previous = PreviousKey::After(key);
        }
    }
}

impl EventSource for MemoryCollection {
    fn subscribe(&self, listener: ListenerRef) -> ListenerId {
        let id = self.source.subscribe(listener.clone());
        if !self.source.is_cancelled() {
            self.replay(&listener);
        }
        id
    }

    fn unsubscribe(&self, id: ListenerId) -> bool {
        self.source.unsubscribe(id)
    }
}

fn previous_key(children: &[Element], index: usize) -> PreviousKey {
    match index.checked_sub(1).and_then(|i| children.get(i)) {
        Some(prev) => PreviousKey::After(prev.key().clone()),
        None => PreviousKey::First,
    }
}

/// Parses canonical 32-bit integer keys (`0`, `42`, `-7`; not `007` or `+1`).
fn integer_key(key: &str) -> Option<i32> {
    let digits = key.strip_prefix('-').unwrap_or(key);
    let canonical = if digits == "0" {
        digits.len() == key.len()
    } else {
        !digits.is_empty()
            && !digits.starts_with('0')
            && digits.bytes().all(|b| b.is_ascii_digit())
    };
    if canonical {
        key.parse::<i32>().ok()
    } else {
        None
    }
}

fn compare_keys(a: &str, b: &str) -> Ordering {
    match (integer_key(a), integer_key(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

fn value_rank(value: Option<&Document>) -> u8 {
    match value {
        None | Some(Document::Null) => 0,
        Some(Document::Bool(false)) => 1,
        Some(Document::Bool(true)) => 2,
        Some(Document::Int(_)) | Some(Document::Float(_)) => 3,
        Some(Document::String(_)) => 4,
        Some(Document::List(_)) | Some(Document::Map(_)) => 5,
    }
}

fn compare_values(a: Option<&Document>, b: Option<&Document>) -> Ordering {
    value_rank(a).cmp(&value_rank(b)).then_with(|| match (a, b) {
        (Some(Document::String(x)), Some(Document::String(y))) => x.cmp(y),
        (Some(x), Some(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            _ => Ordering::Equal,
        },
        _ => Ordering::Equal,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ChildEventKind;
    use crate::source::ChildListener;
    use alloc::rc::Rc;
    use alloc::vec;
    use strand_core::{CancelKind, Error};

    #[derive(Default)]
    struct Recorder {
        events: Vec<ChildEvent>,
        cancelled: bool,
    }

    impl ChildListener for Recorder {
        fn on_child_event(&mut self, event: ChildEvent) -> Result<()> {
            self.events.push(event);
            Ok(())
        }

        fn on_cancelled(&mut self, _error: SourceError) {
            self.cancelled = true;
        }
    }

    fn attach(collection: &MemoryCollection) -> Rc<RefCell<Recorder>> {
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        let listener: Rc<RefCell<dyn ChildListener>> = recorder.clone();
        collection.subscribe(Rc::downgrade(&listener));
        recorder
    }

    fn score(n: i64) -> Document {
        Document::map([("score", Document::from(n))])
    }

    fn keys(collection: &MemoryCollection) -> Vec<Key> {
        collection.keys()
    }

    #[test]
    fn test_key_order() {
        let collection = MemoryCollection::new();
        collection.set("b", Document::Null).unwrap();
        collection.set("10", Document::Null).unwrap();
        collection.set("a", Document::Null).unwrap();
        collection.set("9", Document::Null).unwrap();
        collection.set("007", Document::Null).unwrap();

        let expected: Vec<Key> = ["9", "10", "007", "a", "b"]
            .into_iter()
            .map(Key::from)
            .collect();
        assert_eq!(keys(&collection), expected);
    }

    #[test]
    fn test_integer_key_parsing() {
        assert_eq!(integer_key("0"), Some(0));
        assert_eq!(integer_key("-7"), Some(-7));
        assert_eq!(integer_key("42"), Some(42));
        assert_eq!(integer_key("-0"), None);
        assert_eq!(integer_key("007"), None);
        assert_eq!(integer_key("+1"), None);
        assert_eq!(integer_key(""), None);
        assert_eq!(integer_key("99999999999"), None);
    }

    #[test]
    fn test_added_events_carry_previous_key() {
        let collection = MemoryCollection::new();
        let recorder = attach(&collection);

        collection.set("b", Document::Null).unwrap();
        collection.set("a", Document::Null).unwrap();
        collection.set("c", Document::Null).unwrap();

        let events = &recorder.borrow().events;
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].previous(), Some(&PreviousKey::First));
        assert_eq!(events[1].previous(), Some(&PreviousKey::First));
        assert_eq!(events[2].previous(), Some(&PreviousKey::after("b")));
    }

    #[test]
    fn test_set_existing_emits_changed() {
        let collection = MemoryCollection::new();
        let recorder = attach(&collection);

        collection.set("a", score(1)).unwrap();
        collection.set("a", score(2)).unwrap();

        let events = &recorder.borrow().events;
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].kind(), ChildEventKind::Changed);
        assert_eq!(events[1].element().value(), &score(2));
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn test_child_order_emits_moved_then_changed() {
        let collection = MemoryCollection::ordered_by_child("score");
        collection.set("a", score(1)).unwrap();
        collection.set("b", score(2)).unwrap();
        collection.set("c", score(3)).unwrap();
        let recorder = attach(&collection);
        recorder.borrow_mut().events.clear();

        collection.set("a", score(10)).unwrap();

        let events = &recorder.borrow().events;
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind(), ChildEventKind::Moved);
        assert_eq!(events[0].previous(), Some(&PreviousKey::after("c")));
        assert_eq!(events[1].kind(), ChildEventKind::Changed);
        assert_eq!(
            keys(&collection),
            vec![Key::from("b"), Key::from("c"), Key::from("a")]
        );
    }

    #[test]
    fn test_child_order_value_ranks() {
        let collection = MemoryCollection::ordered_by_child("v");
        collection.set("str", Document::map([("v", "x")])).unwrap();
        collection.set("num", Document::map([("v", 5)])).unwrap();
        collection.set("missing", Document::Null).unwrap();
        collection.set("yes", Document::map([("v", true)])).unwrap();
        collection.set("no", Document::map([("v", false)])).unwrap();
        collection.set("float", Document::map([("v", 4.5)])).unwrap();

        let expected: Vec<Key> = ["missing", "no", "yes", "float", "num", "str"]
            .into_iter()
            .map(Key::from)
            .collect();
        assert_eq!(keys(&collection), expected);
    }

    #[test]
    fn test_remove() {
        let collection = MemoryCollection::new();
        let recorder = attach(&collection);
        collection.set("a", Document::Null).unwrap();

        assert!(collection.remove("a").unwrap());
        assert!(!collection.remove("a").unwrap());

        let events = &recorder.borrow().events;
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].kind(), ChildEventKind::Removed);
        assert!(collection.is_empty());
    }

    #[test]
    fn test_subscribe_replays_existing_children() {
        let collection = MemoryCollection::new();
        collection.set("a", Document::Null).unwrap();
        collection.set("b", Document::Null).unwrap();

        let recorder = attach(&collection);

        let events = &recorder.borrow().events;
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].key(), "a");
        assert_eq!(events[0].previous(), Some(&PreviousKey::First));
        assert_eq!(events[1].previous(), Some(&PreviousKey::after("a")));
    }

    #[test]
    fn test_cancel() {
        let collection = MemoryCollection::new();
        let recorder = attach(&collection);

        collection.cancel(SourceError::new(CancelKind::PermissionDenied, "revoked"));

        assert!(recorder.borrow().cancelled);
        assert!(matches!(
            collection.set("a", Document::Null),
            Err(Error::SourceCancelled(_))
        ));
    }

    #[test]
    fn test_writes_after_cancel_are_not_applied() {
        let collection = MemoryCollection::new();
        collection.set("a", score(1)).unwrap();
        collection.cancel(SourceError::new(CancelKind::Disconnected, "gone"));

        assert!(collection.set("b", score(2)).is_err());
        assert!(collection.set("a", score(5)).is_err());
        assert!(collection.remove("a").is_err());

        assert_eq!(collection.len(), 1);
        assert_eq!(collection.get("a").map(|e| e.value().clone()), Some(score(1)));
        assert!(collection.get("b").is_none());
    }

    /// Fails every Moved it is handed.
    struct RejectMoves;

    impl ChildListener for RejectMoves {
        fn on_child_event(&mut self, event: ChildEvent) -> Result<()> {
            match event {
                ChildEvent::Moved { element, .. } => Err(Error::key_not_found(element.key())),
                _ => Ok(()),
            }
        }

        fn on_cancelled(&mut self, _error: SourceError) {}
    }

    #[test]
    fn test_listener_error_keeps_write_and_later_events() {
        let collection = MemoryCollection::ordered_by_child("score");
        collection.set("a", score(1)).unwrap();
        collection.set("b", score(2)).unwrap();

        let rejecting: Rc<RefCell<dyn ChildListener>> = Rc::new(RefCell::new(RejectMoves));
        collection.subscribe(Rc::downgrade(&rejecting));
        let recorder = attach(&collection);
        recorder.borrow_mut().events.clear();

        let result = collection.set("a", score(10));

        assert_eq!(result, Err(Error::key_not_found("a")));
        assert_eq!(keys(&collection), vec![Key::from("b"), Key::from("a")]);
        let kinds: Vec<ChildEventKind> =
            recorder.borrow().events.iter().map(ChildEvent::kind).collect();
        assert_eq!(kinds, vec![ChildEventKind::Moved, ChildEventKind::Changed]);
    }
}
