//! In-process event relay.
//!
//! `LocalSource` is the simplest `EventSource`: whoever owns it pushes child
//! events in with `emit`, and every live listener receives them in
//! subscription order.

use crate::event::ChildEvent;
use crate::source::{ChildListener, EventSource, ListenerId, ListenerRef};
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use log::{trace, warn};
use strand_core::{Error, Result, SourceError};

/// An event source fed directly by its owner.
///
/// # Example
///
/// ```ignore
/// use strand_events::{ChildEvent, LocalSource, PreviousKey};
///
/// let source = Rc::new(LocalSource::new());
/// let view = OrderedView::attach(source.clone());
///
/// source.emit(ChildEvent::added(element, PreviousKey::First))?;
/// assert_eq!(view.borrow().len(), 1);
/// ```
pub struct LocalSource {
    /// Registered listeners, in subscription order
    listeners: RefCell<Vec<(ListenerId, ListenerRef)>>,
    /// Next listener ID to assign
    next_id: Cell<ListenerId>,
    /// Set once the source has been cancelled
    cancelled: RefCell<Option<SourceError>>,
}

impl Default for LocalSource {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalSource {
    /// Creates a new source with no listeners.
    pub fn new() -> Self {
        Self {
            listeners: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
            cancelled: RefCell::new(None),
        }
    }

    /// Delivers an event to every live listener.
    ///
    /// All listeners receive the event even if one of them fails; the first
    /// failure is returned.
    pub fn emit(&self, event: ChildEvent) -> Result<()> {
        if let Some(error) = self.cancelled.borrow().as_ref() {
            return Err(Error::source_cancelled(error.clone()));
        }

        let listeners = self.live_listeners();
        trace!(
            "emitting {} for `{}` to {} listener(s)",
            event.kind(),
            event.key(),
            listeners.len()
        );

        let mut outcome = Ok(());
        for listener in listeners {
            let result = listener.borrow_mut().on_child_event(event.clone());
            if let Err(err) = result {
                if outcome.is_ok() {
                    outcome = Err(err);
                }
            }
        }
        outcome
    }

    /// Terminates the source and notifies every listener.
    ///
    /// Listeners are dropped; later `emit` calls fail with `SourceCancelled`
    /// and later subscribers are cancelled immediately.
    pub fn cancel(&self, error: SourceError) {
        if self.cancelled.borrow().is_some() {
            return;
        }
        warn!("event source cancelled: {}", error);
        *self.cancelled.borrow_mut() = Some(error.clone());

        let listeners = core::mem::take(&mut *self.listeners.borrow_mut());
        for (_, listener) in listeners {
            if let Some(listener) = listener.upgrade() {
                listener.borrow_mut().on_cancelled(error.clone());
            }
        }
    }

    /// Returns the cancellation error, if the source was cancelled.
    pub fn cancellation(&self) -> Option<SourceError> {
        self.cancelled.borrow().clone()
    }

    /// Returns true if the source was cancelled.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.borrow().is_some()
    }

    /// Returns the number of live listeners.
    pub fn listener_count(&self) -> usize {
        self.prune();
        self.listeners.borrow().len()
    }

    /// Drops registrations whose listener no longer exists.
    fn prune(&self) {
        self.listeners
            .borrow_mut()
            .retain(|(_, listener)| listener.strong_count() > 0);
    }

    /// Snapshots the live listeners so delivery holds no borrow of the list.
    fn live_listeners(&self) -> Vec<Rc<RefCell<dyn ChildListener>>> {
        self.prune();
        self.listeners
            .borrow()
            .iter()
            .filter_map(|(_, listener)| listener.upgrade())
            .collect()
    }
}

impl EventSource for LocalSource {
    fn subscribe(&self, listener: ListenerRef) -> ListenerId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);

        let cancelled = self.cancelled.borrow().clone();
        match cancelled {
            Some(error) => {
                if let Some(listener) = listener.upgrade() {
                    listener.borrow_mut().on_cancelled(error);
                }
            }
            None => self.listeners.borrow_mut().push((id, listener)),
        }
        id
    }

    fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        listeners.len() != before
    }
}
