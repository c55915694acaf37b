//! Child event types.
//!
//! A `ChildEvent` describes one mutation of the remote collection. Positions
//! are never absolute: insertions and moves name the key that should
//! immediately precede the affected child.

use core::fmt;
use strand_core::{Element, Key};

/// The predecessor hint carried by Added, Changed and Moved events.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum PreviousKey {
    /// The child goes first.
    #[default]
    First,
    /// The child goes immediately after this key.
    After(Key),
}

impl PreviousKey {
    /// Creates an `After` hint.
    pub fn after(key: impl Into<Key>) -> Self {
        PreviousKey::After(key.into())
    }

    /// Returns the predecessor key, or `None` for `First`.
    #[inline]
    pub fn key(&self) -> Option<&Key> {
        match self {
            PreviousKey::First => None,
            PreviousKey::After(key) => Some(key),
        }
    }

    /// Returns true if this is the `First` sentinel.
    #[inline]
    pub fn is_first(&self) -> bool {
        matches!(self, PreviousKey::First)
    }
}

impl From<Option<Key>> for PreviousKey {
    fn from(v: Option<Key>) -> Self {
        match v {
            Some(key) => PreviousKey::After(key),
            None => PreviousKey::First,
        }
    }
}

/// The kind of a child event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChildEventKind {
    Added,
    Changed,
    Removed,
    Moved,
}

impl fmt::Display for ChildEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChildEventKind::Added => "added",
            ChildEventKind::Changed => "changed",
            ChildEventKind::Removed => "removed",
            ChildEventKind::Moved => "moved",
        };
        f.write_str(name)
    }
}

/// One mutation of the remote collection.
#[derive(Clone, Debug, PartialEq)]
pub enum ChildEvent {
    /// A child was inserted after `previous`.
    Added {
        element: Element,
        previous: PreviousKey,
    },
    /// A child's document was replaced.
    Changed {
        element: Element,
        previous: PreviousKey,
    },
    /// A child was deleted.
    Removed { element: Element },
    /// A child was repositioned after `previous`.
    Moved {
        element: Element,
        previous: PreviousKey,
    },
}

impl ChildEvent {
    /// Creates an Added event.
    #[inline]
    pub fn added(element: Element, previous: PreviousKey) -> Self {
        ChildEvent::Added { element, previous }
    }

    /// Creates a Changed event.
    #[inline]
    pub fn changed(element: Element, previous: PreviousKey) -> Self {
        ChildEvent::Changed { element, previous }
    }

    /// Creates a Removed event.
    #[inline]
    pub fn removed(element: Element) -> Self {
        ChildEvent::Removed { element }
    }

    /// Creates a Moved event.
    #[inline]
    pub fn moved(element: Element, previous: PreviousKey) -> Self {
        ChildEvent::Moved { element, previous }
    }

    /// Returns the event kind.
    pub fn kind(&self) -> ChildEventKind {
        match self {
            ChildEvent::Added { .. } => ChildEventKind::Added,
            ChildEvent::Changed { .. } => ChildEventKind::Changed,
            ChildEvent::Removed { .. } => ChildEventKind::Removed,
            ChildEvent::Moved { .. } => ChildEventKind::Moved,
        }
    }

    /// Returns the element snapshot carried by the event.
    pub fn element(&self) -> &Element {
        match self {
            ChildEvent::Added { element, .. }
            | ChildEvent::Changed { element, .. }
            | ChildEvent::Removed { element }
            | ChildEvent::Moved { element, .. } => element,
        }
    }

    /// Returns the key of the affected child.
    #[inline]
    pub fn key(&self) -> &Key {
        self.element().key()
    }

    /// Returns the predecessor hint, if the event carries one.
    pub fn previous(&self) -> Option<&PreviousKey> {
        match self {
            ChildEvent::Added { previous, .. }
            | ChildEvent::Changed { previous, .. }
            | ChildEvent::Moved { previous, .. } => Some(previous),
            ChildEvent::Removed { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use strand_core::Document;

    fn element(key: &str) -> Element {
        Element::new(key, Document::Null)
    }

    #[test]
    fn test_event_kind() {
        assert_eq!(
            ChildEvent::added(element("a"), PreviousKey::First).kind(),
            ChildEventKind::Added
        );
        assert_eq!(
            ChildEvent::changed(element("a"), PreviousKey::First).kind(),
            ChildEventKind::Changed
        );
        assert_eq!(
            ChildEvent::removed(element("a")).kind(),
            ChildEventKind::Removed
        );
        assert_eq!(
            ChildEvent::moved(element("a"), PreviousKey::after("b")).kind(),
            ChildEventKind::Moved
        );
    }

    #[test]
    fn test_event_accessors() {
        let event = ChildEvent::moved(element("a"), PreviousKey::after("b"));
        assert_eq!(event.key(), "a");
        assert_eq!(
            event.previous().and_then(PreviousKey::key),
            Some(&Key::from("b"))
        );

        let event = ChildEvent::removed(element("a"));
        assert!(event.previous().is_none());
    }

    #[test]
    fn test_previous_key_from_option() {
        assert!(PreviousKey::from(None).is_first());
        assert_eq!(
            PreviousKey::from(Some(Key::from("k"))),
            PreviousKey::after("k")
        );
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ChildEventKind::Moved.to_string(), "moved");
    }
}
