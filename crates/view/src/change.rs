//! Change notifications for ordered views.
//!
//! A `Change` tells an observer which indices of the view were affected by
//! one mutation, so it can patch its own copy (e.g. a list adapter) instead
//! of redrawing everything.

use core::fmt;

/// The kind of change applied to a view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// An element was inserted at `index`.
    Added,
    /// The element at `index` was replaced.
    Changed,
    /// The element at `index` was removed.
    Removed,
    /// An element moved from `old_index` to `index`.
    Moved,
    /// The whole view must be treated as stale.
    AllChanged,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChangeKind::Added => "added",
            ChangeKind::Changed => "changed",
            ChangeKind::Removed => "removed",
            ChangeKind::Moved => "moved",
            ChangeKind::AllChanged => "all changed",
        };
        f.write_str(name)
    }
}

/// One change notification.
///
/// `old_index` is only set for `Moved`. `AllChanged` always carries index 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Change {
    pub kind: ChangeKind,
    pub index: usize,
    pub old_index: Option<usize>,
}

impl Change {
    /// Creates an Added change.
    #[inline]
    pub fn added(index: usize) -> Self {
        Self::at(ChangeKind::Added, index)
    }

    /// Creates a Changed change.
    #[inline]
    pub fn changed(index: usize) -> Self {
        Self::at(ChangeKind::Changed, index)
    }

    /// Creates a Removed change.
    #[inline]
    pub fn removed(index: usize) -> Self {
        Self::at(ChangeKind::Removed, index)
    }

    /// Creates a Moved change.
    #[inline]
    pub fn moved(index: usize, old_index: usize) -> Self {
        Self {
            kind: ChangeKind::Moved,
            index,
            old_index: Some(old_index),
        }
    }

    /// Creates the bulk AllChanged change.
    #[inline]
    pub fn all_changed() -> Self {
        Self::at(ChangeKind::AllChanged, 0)
    }

    /// Returns true if this is an AllChanged notification.
    #[inline]
    pub fn is_bulk(&self) -> bool {
        self.kind == ChangeKind::AllChanged
    }

    fn at(kind: ChangeKind, index: usize) -> Self {
        Self {
            kind,
            index,
            old_index: None,
        }
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.old_index {
            Some(old) => write!(f, "{} {} -> {}", self.kind, old, self.index),
            None => write!(f, "{} at {}", self.kind, self.index),
        }
    }
}
