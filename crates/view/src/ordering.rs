//! Element comparators and sorting for ordered views.
//!
//! A view without a comparator keeps the order of the event stream. With one,
//! it keeps its visible elements sorted, and every comparison goes through
//! `Comparator::compare` followed by the view's `Direction`.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;
use log::warn;
use strand_core::{Element, FieldPath, SortValue, ValueType};

/// Sort direction of a view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Smallest first, or stream order when no comparator is set
    #[default]
    Ascending,
    /// Largest first, or reversed stream order
    Descending,
}

impl Direction {
    /// Applies this direction to a comparison result.
    #[inline]
    pub fn apply(&self, ord: Ordering) -> Ordering {
        match self {
            Direction::Ascending => ord,
            Direction::Descending => ord.reverse(),
        }
    }

    /// Returns the opposite direction.
    #[inline]
    pub fn reverse(&self) -> Self {
        match self {
            Direction::Ascending => Direction::Descending,
            Direction::Descending => Direction::Ascending,
        }
    }

    /// Returns true for `Descending`.
    #[inline]
    pub fn is_descending(&self) -> bool {
        matches!(self, Direction::Descending)
    }
}

/// Orders elements by one field of their documents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldOrdering {
    path: FieldPath,
    value_type: ValueType,
}

impl FieldOrdering {
    /// Creates an ordering on the field at `path`, read as `value_type`.
    pub fn new(path: impl Into<FieldPath>, value_type: ValueType) -> Self {
        Self {
            path: path.into(),
            value_type,
        }
    }

    /// Returns the field path.
    #[inline]
    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    /// Returns the value type the field is read as.
    #[inline]
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Compares two elements by the field.
    ///
    /// Returns `None` when either element lacks the field or holds a value
    /// that cannot be read as the value type.
    pub fn compare(&self, a: &Element, b: &Element) -> Option<Ordering> {
        match (self.read(a), self.read(b)) {
            (Some(left), Some(right)) => Some(left.cmp(&right)),
            (left, _) => {
                let missing = if left.is_none() { a.key() } else { b.key() };
                warn!(
                    "cannot compare `{}` and `{}`: `{}` has no {} at `{}`",
                    a.key(),
                    b.key(),
                    missing,
                    self.value_type.name(),
                    self.path
                );
                None
            }
        }
    }

    fn read<'a>(&self, element: &'a Element) -> Option<SortValue<'a>> {
        element
            .child(&self.path)
            .and_then(|doc| self.value_type.read(doc))
    }
}

/// A caller-supplied element comparison.
pub type CompareFn = Box<dyn Fn(&Element, &Element) -> Ordering>;

/// The comparator installed on a view.
pub enum Comparator {
    /// Compare one field of each document
    Field(FieldOrdering),
    /// Compare with a caller-supplied function
    Custom(CompareFn),
}

impl Comparator {
    /// Creates a field comparator.
    pub fn field(path: impl Into<FieldPath>, value_type: ValueType) -> Self {
        Comparator::Field(FieldOrdering::new(path, value_type))
    }

    /// Creates a custom comparator.
    pub fn custom<F>(compare: F) -> Self
    where
        F: Fn(&Element, &Element) -> Ordering + 'static,
    {
        Comparator::Custom(Box::new(compare))
    }

    /// Compares two elements in ascending order.
    ///
    /// `None` marks a comparison anomaly (see `FieldOrdering::compare`).
    pub fn compare(&self, a: &Element, b: &Element) -> Option<Ordering> {
        match self {
            Comparator::Field(ordering) => ordering.compare(a, b),
            Comparator::Custom(compare) => Some(compare(a, b)),
        }
    }
}

impl fmt::Debug for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparator::Field(ordering) => f.debug_tuple("Field").field(ordering).finish(),
            Comparator::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Sorts `items` stably by `compare`.
///
/// Unlike `slice::sort_by`, this never panics when `compare` is not a total
/// order; such input just ends up in some permutation.
pub fn stable_sort_by<T, F>(items: &mut Vec<T>, mut compare: F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    if items.len() < 2 {
        return;
    }

    let mut order: Vec<usize> = (0..items.len()).collect();
    let mut buf = Vec::with_capacity(items.len());
    merge_sort(&mut order, &mut buf, &mut |a, b| compare(&items[a], &items[b]));

    let mut slots: Vec<Option<T>> = items.drain(..).map(Some).collect();
    items.extend(order.into_iter().filter_map(|i| slots[i].take()));
}

fn merge_sort<F>(idx: &mut [usize], buf: &mut Vec<usize>, compare: &mut F)
where
    F: FnMut(usize, usize) -> Ordering,
{
    let len = idx.len();
    if len < 2 {
        return;
    }

    let mid = len / 2;
    merge_sort(&mut idx[..mid], buf, compare);
    merge_sort(&mut idx[mid..], buf, compare);

    // Halves already in order
    if compare(idx[mid], idx[mid - 1]) != Ordering::Less {
        return;
    }

    buf.clear();
    let (mut i, mut j) = (0, mid);
    while i < mid && j < len {
        // Take from the right half only when strictly less, to stay stable
        if compare(idx[j], idx[i]) == Ordering::Less {
            buf.push(idx[j]);
            j += 1;
        } else {
            buf.push(idx[i]);
            i += 1;
        }
    }
    buf.extend_from_slice(&idx[i..mid]);
    buf.extend_from_slice(&idx[j..]);
    idx.copy_from_slice(buf);
}
