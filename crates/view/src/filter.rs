//! Exclusion filters.

use alloc::boxed::Box;
use core::fmt;
use strand_core::Element;

/// Hides every element the predicate matches.
///
/// Note the polarity: a predicate returning `true` removes the element from
/// the view.
pub struct Filter {
    predicate: Box<dyn Fn(&Element) -> bool>,
}

impl Filter {
    /// Creates a filter excluding the elements `predicate` matches.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Element) -> bool + 'static,
    {
        Self {
            predicate: Box::new(predicate),
        }
    }

    /// Returns true if `element` is hidden by this filter.
    #[inline]
    pub fn excludes(&self, element: &Element) -> bool {
        (self.predicate)(element)
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Filter(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strand_core::{Document, FieldPath};

    #[test]
    fn test_excludes() {
        let archived = FieldPath::parse("archived");
        let filter =
            Filter::new(move |e| e.child(&archived).and_then(Document::as_bool) == Some(true));

        let hidden = Element::new("a", Document::map([("archived", true)]));
        let shown = Element::new("b", Document::map([("archived", false)]));
        let no_field = Element::new("c", Document::Null);

        assert!(filter.excludes(&hidden));
        assert!(!filter.excludes(&shown));
        assert!(!filter.excludes(&no_field));
    }
}
