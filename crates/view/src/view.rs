//! Ordered views over child event streams.
//!
//! An `OrderedView` turns a stream of keyed child events into an indexable
//! sequence. Events never carry absolute positions: each insertion or move
//! names the key that should now precede the child, and the view resolves
//! that hint against every key it has been told about.
//!
//! The view keeps three pieces of state:
//!
//! - `order`: every delivered key in stream order, including keys hidden by
//!   the filter, so predecessor hints that name a hidden key still resolve
//! - `hidden`: the latest snapshot of each hidden element
//! - `sequence`: the visible elements, in view order
//!
//! Without a comparator `sequence` follows `order` (reversed when the
//! direction is descending). With one, `sequence` is kept sorted and `order`
//! is only used to resolve hints and to restore stream order later.

use crate::change::Change;
use crate::filter::Filter;
use crate::observer::{ChangeObserver, ObserverSlot};
use crate::ordering::{stable_sort_by, Comparator, Direction};
use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::cmp::Ordering;
use core::fmt;
use hashbrown::HashMap;
use log::{debug, warn};
use strand_core::{Element, Error, FieldPath, Key, Result, SourceError, ValueType};
use strand_events::{ChildEvent, ChildListener, EventSource, ListenerId, PreviousKey};

/// Callback invoked once when the view's source is cancelled.
pub type CancelHandler = Box<dyn FnMut(&SourceError)>;

/// Lifecycle state of a view.
#[derive(Clone, Debug, PartialEq)]
enum ViewState {
    Live,
    Cancelled(SourceError),
    TornDown,
}

/// The source a view is subscribed to.
struct SourceBinding {
    source: Rc<dyn EventSource>,
    listener: ListenerId,
}

/// A locally materialized, ordered and filtered view of a remote collection.
///
/// # Example
///
/// ```ignore
/// use strand_view::{Direction, OrderedView};
/// use strand_core::ValueType;
///
/// let view = OrderedView::builder()
///     .order_by("score", ValueType::Integer)
///     .direction(Direction::Descending)
///     .attach(remote.clone());
///
/// view.borrow_mut().set_observer(|change| adapter.apply(change));
/// ```
pub struct OrderedView {
    /// Every delivered key in stream order, hidden ones included
    order: Vec<Key>,
    /// Elements currently excluded by the filter
    hidden: HashMap<Key, Element>,
    /// Visible elements in view order
    sequence: Vec<Element>,
    comparator: Option<Comparator>,
    direction: Direction,
    filter: Option<Filter>,
    observer: ObserverSlot,
    binding: Option<SourceBinding>,
    state: ViewState,
    cancel_handler: Option<CancelHandler>,
    /// Comparisons that fell back to "equal"
    anomalies: Cell<u64>,
}

impl Default for OrderedView {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderedView {
    /// Creates a detached view in stream order.
    pub fn new() -> Self {
        Self {
            order: Vec::new(),
            hidden: HashMap::new(),
            sequence: Vec::new(),
            comparator: None,
            direction: Direction::Ascending,
            filter: None,
            observer: ObserverSlot::new(),
            binding: None,
            state: ViewState::Live,
            cancel_handler: None,
            anomalies: Cell::new(0),
        }
    }

    /// Returns a builder for configuring a view before it sees any event.
    pub fn builder() -> OrderedViewBuilder {
        OrderedViewBuilder::new()
    }

    /// Subscribes the view to `source` and returns the shared handle.
    ///
    /// The source only holds a weak reference: dropping every clone of the
    /// returned handle detaches the view.
    pub fn attach<S>(self, source: Rc<S>) -> Rc<RefCell<Self>>
    where
        S: EventSource + 'static,
    {
        let source: Rc<dyn EventSource> = source;
        let view = Rc::new(RefCell::new(self));
        let listener: Rc<RefCell<dyn ChildListener>> = view.clone();

        // Sources may replay existing children here, so no borrow is held
        let id = source.subscribe(Rc::downgrade(&listener));

        let mut this = view.borrow_mut();
        if this.is_live() {
            this.binding = Some(SourceBinding {
                source,
                listener: id,
            });
        }
        drop(this);
        view
    }

    // ---- Read access ----

    /// Returns the number of visible elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    /// Returns true if no element is visible.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Returns the element at `index`.
    pub fn item_at(&self, index: usize) -> Result<&Element> {
        self.sequence
            .get(index)
            .ok_or_else(|| Error::out_of_range(index, self.sequence.len()))
    }

    /// Returns the element at `index`, if any.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Element> {
        self.sequence.get(index)
    }

    /// Iterates over the visible elements in view order.
    pub fn iter(&self) -> core::slice::Iter<'_, Element> {
        self.sequence.iter()
    }

    /// Iterates over the keys of the visible elements in view order.
    pub fn keys(&self) -> impl Iterator<Item = &Key> + '_ {
        self.sequence.iter().map(Element::key)
    }

    /// Returns the index of the visible element with `key`.
    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.sequence.iter().position(|e| e.key() == key)
    }

    /// Returns true if an element with `key` is visible.
    pub fn contains_key(&self, key: &str) -> bool {
        self.index_of(key).is_some()
    }

    /// Returns the number of elements hidden by the filter.
    pub fn excluded_len(&self) -> usize {
        self.hidden.len()
    }

    /// Returns the current direction.
    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Returns the installed comparator, if any.
    pub fn comparator(&self) -> Option<&Comparator> {
        self.comparator.as_ref()
    }

    /// Returns true if a filter is installed.
    pub fn has_filter(&self) -> bool {
        self.filter.is_some()
    }

    /// Returns how many comparisons could not read the ordering field.
    pub fn anomaly_count(&self) -> u64 {
        self.anomalies.get()
    }

    /// Returns true until the view is torn down or its source is cancelled.
    #[inline]
    pub fn is_live(&self) -> bool {
        self.state == ViewState::Live
    }

    /// Returns true once `teardown` has run.
    pub fn is_torn_down(&self) -> bool {
        self.state == ViewState::TornDown
    }

    /// Returns the error the source was cancelled with, if it was.
    pub fn cancellation(&self) -> Option<&SourceError> {
        match &self.state {
            ViewState::Cancelled(error) => Some(error),
            _ => None,
        }
    }

    // ---- Observers ----

    /// Registers the observer, replacing any previous one.
    ///
    /// Nothing is replayed; the observer sees changes from now on. It must
    /// not call back into the view.
    pub fn set_observer<F>(&mut self, observer: F)
    where
        F: FnMut(Change) + 'static,
    {
        self.observer.replace(observer);
    }

    /// Removes the observer.
    pub fn clear_observer(&mut self) {
        self.observer.clear();
    }

    /// Registers the callback run when the source is cancelled.
    pub fn set_cancel_handler<F>(&mut self, handler: F)
    where
        F: FnMut(&SourceError) + 'static,
    {
        self.cancel_handler = Some(Box::new(handler));
    }

    // ---- Configuration ----

    /// Orders the view by the field at `path`, read as `value_type`.
    ///
    /// Elements that lack the field compare equal to everything (see
    /// `anomaly_count`). Emits one `AllChanged`.
    pub fn set_ordering(
        &mut self,
        path: impl Into<FieldPath>,
        direction: Direction,
        value_type: ValueType,
    ) -> Result<()> {
        self.install_comparator(Comparator::field(path, value_type), direction)
    }

    /// Orders the view with a caller-supplied comparison. Emits one
    /// `AllChanged`.
    pub fn set_comparator<F>(&mut self, compare: F, direction: Direction) -> Result<()>
    where
        F: Fn(&Element, &Element) -> Ordering + 'static,
    {
        self.install_comparator(Comparator::custom(compare), direction)
    }

    /// Drops the comparator and goes back to stream order. Emits one
    /// `AllChanged`.
    pub fn clear_ordering(&mut self) -> Result<()> {
        self.ensure_live()?;
        self.comparator = None;
        self.rebuild();
        self.observer.notify(Change::all_changed());
        Ok(())
    }

    /// Switches the view to descending order. Emits one `AllChanged`.
    ///
    /// This sets the direction rather than toggling it, so the call is
    /// idempotent: on a view that is already descending the order stays as
    /// it is. `set_ordering` and `set_comparator` take an explicit direction.
    pub fn reverse(&mut self) -> Result<()> {
        self.ensure_live()?;
        let was_descending = self.direction.is_descending();
        self.direction = Direction::Descending;

        if self.comparator.is_some() {
            self.resort();
        } else if !was_descending {
            self.sequence.reverse();
        }
        self.observer.notify(Change::all_changed());
        Ok(())
    }

    /// Hides every element `predicate` matches, now and for later events.
    /// Emits one `AllChanged`.
    pub fn set_filter<F>(&mut self, predicate: F) -> Result<()>
    where
        F: Fn(&Element) -> bool + 'static,
    {
        self.ensure_live()?;
        self.filter = Some(Filter::new(predicate));
        self.rebuild();
        self.observer.notify(Change::all_changed());
        Ok(())
    }

    /// Removes the filter; hidden elements reappear in place. Emits one
    /// `AllChanged`.
    pub fn clear_filter(&mut self) -> Result<()> {
        self.ensure_live()?;
        self.filter = None;
        self.rebuild();
        self.observer.notify(Change::all_changed());
        Ok(())
    }

    /// Unsubscribes from the source. The view keeps its contents but ignores
    /// every later event and refuses configuration.
    pub fn teardown(&mut self) {
        if self.is_torn_down() {
            debug!("view already torn down");
            return;
        }
        if let Some(binding) = self.binding.take() {
            binding.source.unsubscribe(binding.listener);
        }
        self.state = ViewState::TornDown;
    }

    // ---- Event application ----

    /// Applies one child event.
    ///
    /// Fails with `KeyNotFound` when the event names a key, or predecessor,
    /// the view has never seen; the view is left unchanged in that case.
    pub fn apply_event(&mut self, event: ChildEvent) -> Result<()> {
        match &self.state {
            ViewState::Live => {}
            ViewState::TornDown => {
                debug!(
                    "dropping {} for `{}`: view torn down",
                    event.kind(),
                    event.key()
                );
                return Ok(());
            }
            ViewState::Cancelled(error) => return Err(Error::source_cancelled(error.clone())),
        }

        match event {
            ChildEvent::Added { element, previous } => self.on_added(element, previous),
            ChildEvent::Changed { element, .. } => self.on_changed(element),
            ChildEvent::Removed { element } => self.on_removed(element),
            ChildEvent::Moved { element, previous } => self.on_moved(element, previous),
        }
    }

    fn on_added(&mut self, element: Element, previous: PreviousKey) -> Result<()> {
        if self.order_position(element.key().as_str()).is_some() {
            debug!("`{}` delivered again, applying as a change", element.key());
            return self.on_changed(element);
        }

        let slot = match &previous {
            PreviousKey::First => 0,
            PreviousKey::After(prev) => self
                .order_position(prev.as_str())
                .map(|pos| pos + 1)
                .ok_or_else(|| Error::key_not_found(prev))?,
        };

        self.order.insert(slot, element.key().clone());
        if self.excludes(&element) {
            self.hidden.insert(element.key().clone(), element);
            return Ok(());
        }

        let index = self.target_index(&element, slot);
        self.sequence.insert(index, element);
        self.observer.notify(Change::added(index));
        Ok(())
    }

    fn on_changed(&mut self, element: Element) -> Result<()> {
        let key = element.key().clone();
        let pos = self
            .order_position(key.as_str())
            .ok_or_else(|| Error::key_not_found(&key))?;
        let excluded = self.excludes(&element);

        match self.index_of(key.as_str()) {
            Some(old) if excluded => {
                self.sequence.remove(old);
                self.hidden.insert(key, element);
                self.observer.notify(Change::removed(old));
            }
            Some(old) => {
                self.sequence[old] = element;
                let index = if self.comparator.is_some() {
                    self.resort();
                    self.index_of(key.as_str()).unwrap_or(old)
                } else {
                    old
                };
                self.observer.notify(Change::changed(index));
            }
            None if excluded => {
                // Still hidden, keep the newest snapshot
                self.hidden.insert(key, element);
            }
            None => {
                self.hidden.remove(&key);
                let index = self.target_index(&element, pos);
                self.sequence.insert(index, element);
                self.observer.notify(Change::added(index));
            }
        }
        Ok(())
    }

    fn on_removed(&mut self, element: Element) -> Result<()> {
        let key = element.key();
        let pos = self
            .order_position(key.as_str())
            .ok_or_else(|| Error::key_not_found(key))?;
        self.order.remove(pos);

        if self.hidden.remove(key).is_some() {
            return Ok(());
        }
        if let Some(index) = self.index_of(key.as_str()) {
            self.sequence.remove(index);
            self.observer.notify(Change::removed(index));
        }
        Ok(())
    }

    fn on_moved(&mut self, element: Element, previous: PreviousKey) -> Result<()> {
        let key = element.key().clone();
        let pos = self
            .order_position(key.as_str())
            .ok_or_else(|| Error::key_not_found(&key))?;

        // Slot in `order` once `key` has been taken out of it
        let slot = match &previous {
            PreviousKey::First => 0,
            PreviousKey::After(prev) => {
                let prev_pos = self
                    .order_position(prev.as_str())
                    .filter(|&p| p != pos)
                    .ok_or_else(|| Error::key_not_found(prev))?;
                if prev_pos < pos {
                    prev_pos + 1
                } else {
                    prev_pos
                }
            }
        };

        self.order.remove(pos);
        self.order.insert(slot, key.clone());

        let excluded = self.excludes(&element);
        match self.index_of(key.as_str()) {
            Some(old) if excluded => {
                self.sequence.remove(old);
                self.hidden.insert(key, element);
                self.observer.notify(Change::removed(old));
            }
            Some(old) => {
                self.sequence.remove(old);
                let index = self.target_index(&element, slot);
                self.sequence.insert(index, element);
                self.observer.notify(Change::moved(index, old));
            }
            None if excluded => {
                self.hidden.insert(key, element);
            }
            None => {
                self.hidden.remove(&key);
                let index = self.target_index(&element, slot);
                self.sequence.insert(index, element);
                self.observer.notify(Change::added(index));
            }
        }
        Ok(())
    }

    // ---- Internals ----

    fn ensure_live(&self) -> Result<()> {
        match &self.state {
            ViewState::Live => Ok(()),
            ViewState::Cancelled(error) => Err(Error::source_cancelled(error.clone())),
            ViewState::TornDown => Err(Error::TornDown),
        }
    }

    fn install_comparator(&mut self, comparator: Comparator, direction: Direction) -> Result<()> {
        self.ensure_live()?;
        self.comparator = Some(comparator);
        self.direction = direction;
        self.resort();
        self.observer.notify(Change::all_changed());
        Ok(())
    }

    fn order_position(&self, key: &str) -> Option<usize> {
        self.order.iter().position(|k| k == key)
    }

    fn excludes(&self, element: &Element) -> bool {
        self.filter.as_ref().is_some_and(|f| f.excludes(element))
    }

    /// Where a visible element belongs, given that `order[..slot]` precedes it
    /// in the stream. The element must not be in `sequence`.
    fn target_index(&self, element: &Element, slot: usize) -> usize {
        if self.comparator.is_some() {
            let ranks = self.stream_ranks();
            return self.sequence.partition_point(|e| {
                let rank = ranks.get(e.key()).copied().unwrap_or(usize::MAX);
                self.compare(e, element)
                    .then_with(|| self.direction.apply(rank.cmp(&slot)))
                    == Ordering::Less
            });
        }

        let visible_before = self.order[..slot]
            .iter()
            .filter(|k| !self.hidden.contains_key(*k))
            .count();
        if self.direction.is_descending() {
            self.sequence.len() - visible_before
        } else {
            visible_before
        }
    }

    /// Position of every delivered key in stream order.
    fn stream_ranks(&self) -> HashMap<&Key, usize> {
        self.order.iter().enumerate().map(|(i, k)| (k, i)).collect()
    }

    /// Compares two elements under the comparator and direction.
    fn compare(&self, a: &Element, b: &Element) -> Ordering {
        let Some(comparator) = &self.comparator else {
            return Ordering::Equal;
        };
        match comparator.compare(a, b) {
            Some(ord) => self.direction.apply(ord),
            None => {
                self.anomalies.set(self.anomalies.get() + 1);
                Ordering::Equal
            }
        }
    }

    /// Sorts `sequence` by the comparator. Elements that compare equal keep
    /// stream order (reversed when descending), the same rule `target_index`
    /// follows for single insertions.
    fn resort(&mut self) {
        if self.comparator.is_none() {
            return;
        }
        let mut sequence = core::mem::take(&mut self.sequence);
        let ranks = self.stream_ranks();
        stable_sort_by(&mut sequence, |a, b| {
            self.compare(a, b).then_with(|| {
                let rank_a = ranks.get(a.key()).copied().unwrap_or(usize::MAX);
                let rank_b = ranks.get(b.key()).copied().unwrap_or(usize::MAX);
                self.direction.apply(rank_a.cmp(&rank_b))
            })
        });
        drop(ranks);
        self.sequence = sequence;
    }

    /// Recomputes `sequence` and `hidden` from `order` under the current
    /// filter, direction and comparator.
    fn rebuild(&mut self) {
        let mut pool: HashMap<Key, Element> = self
            .sequence
            .drain(..)
            .map(|e| (e.key().clone(), e))
            .collect();
        pool.extend(self.hidden.drain());

        let mut visible = Vec::with_capacity(pool.len());
        let mut hidden = HashMap::new();
        for key in &self.order {
            let Some(element) = pool.remove(key) else {
                warn!("`{}` is ordered but has no snapshot", key);
                continue;
            };
            if self.excludes(&element) {
                hidden.insert(key.clone(), element);
            } else {
                visible.push(element);
            }
        }

        if self.direction.is_descending() {
            visible.reverse();
        }
        self.hidden = hidden;
        self.sequence = visible;
        self.resort();
    }
}

impl ChildListener for OrderedView {
    fn on_child_event(&mut self, event: ChildEvent) -> Result<()> {
        self.apply_event(event)
    }

    fn on_cancelled(&mut self, error: SourceError) {
        if !self.is_live() {
            return;
        }
        warn!("view source cancelled: {}", error);
        self.binding = None;
        self.state = ViewState::Cancelled(error.clone());
        if let Some(handler) = self.cancel_handler.as_mut() {
            handler(&error);
        }
    }
}

impl fmt::Debug for OrderedView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderedView")
            .field("len", &self.sequence.len())
            .field("excluded", &self.hidden.len())
            .field("comparator", &self.comparator)
            .field("direction", &self.direction)
            .field("filtered", &self.filter.is_some())
            .field("state", &self.state)
            .finish()
    }
}

/// Builder for `OrderedView`.
///
/// Everything configured here is in place before the first event, so no
/// `AllChanged` is emitted for it.
#[derive(Default)]
pub struct OrderedViewBuilder {
    comparator: Option<Comparator>,
    direction: Direction,
    filter: Option<Filter>,
    observer: Option<ChangeObserver>,
}

impl OrderedViewBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Orders by the field at `path`, read as `value_type`.
    pub fn order_by(mut self, path: impl Into<FieldPath>, value_type: ValueType) -> Self {
        self.comparator = Some(Comparator::field(path, value_type));
        self
    }

    /// Orders with a caller-supplied comparison.
    pub fn order_by_with<F>(mut self, compare: F) -> Self
    where
        F: Fn(&Element, &Element) -> Ordering + 'static,
    {
        self.comparator = Some(Comparator::custom(compare));
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Hides every element `predicate` matches.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Element) -> bool + 'static,
    {
        self.filter = Some(Filter::new(predicate));
        self
    }

    /// Registers the observer up front, so it also sees the children a
    /// source replays on attach.
    pub fn observer<F>(mut self, observer: F) -> Self
    where
        F: FnMut(Change) + 'static,
    {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn build(self) -> OrderedView {
        let mut view = OrderedView::new();
        view.comparator = self.comparator;
        view.direction = self.direction;
        view.filter = self.filter;
        if let Some(observer) = self.observer {
            view.observer.replace(observer);
        }
        view
    }

    /// Builds the view and subscribes it to `source`.
    pub fn attach<S>(self, source: Rc<S>) -> Rc<RefCell<OrderedView>>
    where
        S: EventSource + 'static,
    {
        self.build().attach(source)
    }
}
