//! Event source and listener seams.
//!
//! Sources hold listeners weakly: dropping the last strong reference to a
//! listener unsubscribes it implicitly, and the source prunes it on the next
//! delivery.

use crate::event::ChildEvent;
use alloc::rc::Weak;
use core::cell::RefCell;
use strand_core::{Result, SourceError};

/// Unique identifier for a listener registration.
pub type ListenerId = u64;

/// A weak handle to a listener, as held by a source.
pub type ListenerRef = Weak<RefCell<dyn ChildListener>>;

/// Receives the child events of one source.
///
/// Events are delivered strictly one at a time. A listener must not call back
/// into the source that is delivering to it.
pub trait ChildListener {
    /// Applies one child event.
    ///
    /// An error means the event could not be applied (typically a broken
    /// causal ordering upstream) and is handed back to whoever drives the
    /// source.
    fn on_child_event(&mut self, event: ChildEvent) -> Result<()>;

    /// Called once when the source terminates abnormally. No further events
    /// follow.
    fn on_cancelled(&mut self, error: SourceError);
}

/// A stream of child events that listeners can attach to.
pub trait EventSource {
    /// Registers a listener and returns its registration id.
    fn subscribe(&self, listener: ListenerRef) -> ListenerId;

    /// Removes a registration. Returns true if it was present.
    fn unsubscribe(&self, id: ListenerId) -> bool;
}
