//! Per-kind conversion strategies and the dispatcher that picks one.
//!
//! A strategy decides how a category's entries are ordered and which extra
//! columns are computed from entry data. Every hook has a default, so a
//! strategy overrides only what its kind needs.

mod feat;
mod field_sort;
mod item;
mod leveled;
mod power;

use std::cmp::Ordering;

use compendium_shared::{Category, CategoryKind, Entry};

pub use feat::FeatStrategy;
pub use field_sort::FieldSortStrategy;
pub use item::ItemStrategy;
pub use leveled::LeveledStrategy;
pub use power::PowerStrategy;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Kind-specific behavior of a category conversion.
pub trait ConvertStrategy: Send + Sync {
    /// Human-readable strategy name for tracing.
    fn name(&self) -> &str;

    /// Columns computed from entry data, inserted before the trailing source column.
    fn computed_columns(&self) -> &[&'static str] {
        &[]
    }

    /// Value of one computed column, given an entry's normalized data.
    fn compute_column(&self, _column: &str, _data: &str) -> String {
        String::new()
    }

    /// Display order of two entries.
    fn compare(&self, a: &Entry, b: &Entry) -> Ordering {
        by_name(a, b)
    }
}

/// Strategy for kinds without special handling: sorted by display name.
pub struct DefaultStrategy;

impl ConvertStrategy for DefaultStrategy {
    fn name(&self) -> &str {
        "default"
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Pick the strategy for a category by its kind.
///
/// Field positions used for sorting are resolved from `category.fields` here,
/// so the returned strategy belongs to this category only.
pub fn strategy_for(category: &Category) -> Box<dyn ConvertStrategy> {
    let fields = &category.fields;
    match category.id {
        CategoryKind::Ritual
        | CategoryKind::Monster
        | CategoryKind::Trap
        | CategoryKind::Poison
        | CategoryKind::Disease => Box::new(LeveledStrategy::new(fields)),
        // Sort by first field
        CategoryKind::Companion | CategoryKind::Terrain => Box::new(FieldSortStrategy::new(0)),
        CategoryKind::Feat => Box::new(FeatStrategy::new(fields)),
        CategoryKind::Item => Box::new(ItemStrategy::new(fields)),
        CategoryKind::Power => Box::new(PowerStrategy::new(fields)),
        CategoryKind::Glossary | CategoryKind::Other(_) => Box::new(DefaultStrategy),
    }
}

// ---------------------------------------------------------------------------
// Helpers shared by strategies
// ---------------------------------------------------------------------------

pub(crate) fn by_name(a: &Entry, b: &Entry) -> Ordering {
    a.display_name.cmp(&b.display_name)
}

/// Position of a field, ignoring ASCII case.
pub(crate) fn field_index(fields: &[String], name: &str) -> Option<usize> {
    fields.iter().position(|f| f.eq_ignore_ascii_case(name))
}

/// Raw field value of an entry, or `""` when the entry has fewer fields.
pub(crate) fn field(entry: &Entry, index: usize) -> &str {
    entry.fields.get(index).map_or("", String::as_str)
}

/// First run of ASCII digits in a field, e.g. `"5+"` and `"Level 5 Elite"` are both 5.
/// Values without digits count as level 0.
pub(crate) fn level(entry: &Entry, index: usize) -> u32 {
    let value = field(entry, index);
    let digits: String = value
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().unwrap_or(0)
}
