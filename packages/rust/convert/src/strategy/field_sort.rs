//! Strategy ordering entries by one raw field.

use std::cmp::Ordering;

use compendium_shared::Entry;

use super::{ConvertStrategy, by_name, field};

/// Sorts by the field at a fixed schema position, then by name.
pub struct FieldSortStrategy {
    index: usize,
}

impl FieldSortStrategy {
    pub fn new(index: usize) -> Self {
        Self { index }
    }
}

impl ConvertStrategy for FieldSortStrategy {
    fn name(&self) -> &str {
        "field-sort"
    }

    fn compare(&self, a: &Entry, b: &Entry) -> Ordering {
        field(a, self.index)
            .cmp(field(b, self.index))
            .then_with(|| by_name(a, b))
    }
}
