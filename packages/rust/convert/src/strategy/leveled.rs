//! Strategy for kinds ordered by level: rituals, monsters, traps, poisons, diseases.

use std::cmp::Ordering;

use compendium_shared::Entry;

use super::{ConvertStrategy, by_name, field_index, level};

/// Sorts numerically by the `Level` field, then by name.
pub struct LeveledStrategy {
    level: usize,
}

impl LeveledStrategy {
    /// Use the `Level` field of the schema, or the first field if there is none.
    pub fn new(fields: &[String]) -> Self {
        Self {
            level: field_index(fields, "Level").unwrap_or(0),
        }
    }
}

impl ConvertStrategy for LeveledStrategy {
    fn name(&self) -> &str {
        "leveled"
    }

    fn compare(&self, a: &Entry, b: &Entry) -> Ordering {
        level(a, self.level)
            .cmp(&level(b, self.level))
            .then_with(|| by_name(a, b))
    }
}
