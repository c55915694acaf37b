//! Observer registration for ordered views.
//!
//! A view drives at most one observer. Registering a new one drops the
//! previous one; nothing is replayed to the newcomer.

use crate::change::Change;
use alloc::boxed::Box;

/// Callback type for change notifications.
pub type ChangeObserver = Box<dyn FnMut(Change)>;

/// Holds the single observer of a view.
#[derive(Default)]
pub struct ObserverSlot {
    /// The registered observer, if any
    observer: Option<ChangeObserver>,
    /// Number of notifications delivered so far
    delivered: u64,
}

impl ObserverSlot {
    /// Creates an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `observer`, dropping the previous one.
    ///
    /// Returns true if an observer was replaced.
    pub fn replace<F>(&mut self, observer: F) -> bool
    where
        F: FnMut(Change) + 'static,
    {
        self.observer.replace(Box::new(observer)).is_some()
    }

    /// Removes the observer. Returns true if one was installed.
    pub fn clear(&mut self) -> bool {
        self.observer.take().is_some()
    }

    /// Returns true if an observer is installed.
    #[inline]
    pub fn is_set(&self) -> bool {
        self.observer.is_some()
    }

    /// Returns the number of notifications delivered.
    #[inline]
    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    /// Delivers a change to the observer, if any.
    pub fn notify(&mut self, change: Change) {
        if let Some(observer) = self.observer.as_mut() {
            self.delivered += 1;
            observer(change);
        }
    }
}
