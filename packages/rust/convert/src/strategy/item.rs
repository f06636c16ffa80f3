//! Item strategy: level order and a computed slot column.

use std::cmp::Ordering;
use std::sync::LazyLock;

use compendium_shared::Entry;
use regex::Regex;

use super::{ConvertStrategy, by_name, field_index, level};

const SLOT: &str = "Slot";

static SLOT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<b>Item Slot</b>:\s*([^<]+)").expect("valid regex"));

/// Sorts by the `Level` field when the schema has one, then by name.
pub struct ItemStrategy {
    level: Option<usize>,
}

impl ItemStrategy {
    pub fn new(fields: &[String]) -> Self {
        Self {
            level: field_index(fields, "Level"),
        }
    }
}

impl ConvertStrategy for ItemStrategy {
    fn name(&self) -> &str {
        "item"
    }

    fn computed_columns(&self) -> &[&'static str] {
        &[SLOT]
    }

    fn compute_column(&self, column: &str, data: &str) -> String {
        if column != SLOT {
            return String::new();
        }
        SLOT_RE
            .captures(data)
            .map(|caps| caps[1].trim().to_string())
            .unwrap_or_default()
    }

    fn compare(&self, a: &Entry, b: &Entry) -> Ordering {
        let by_level = match self.level {
            Some(index) => level(a, index).cmp(&level(b, index)),
            None => Ordering::Equal,
        };
        by_level.then_with(|| by_name(a, b))
    }
}
