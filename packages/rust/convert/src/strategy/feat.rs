//! Feat strategy: tier order and a computed prerequisite column.

use std::cmp::Ordering;
use std::sync::LazyLock;

use compendium_shared::Entry;
use regex::Regex;

use super::{ConvertStrategy, by_name, field, field_index};

const PREREQUISITE: &str = "Prerequisite";

static PREREQUISITE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<b>Prerequisite</b>:\s*([^<]+)").expect("valid regex"));

/// Sorts by tier (Heroic, Paragon, Epic), then by name.
pub struct FeatStrategy {
    tier: Option<usize>,
}

impl FeatStrategy {
    pub fn new(fields: &[String]) -> Self {
        Self {
            tier: field_index(fields, "Tier"),
        }
    }

    fn tier_rank(&self, entry: &Entry) -> u8 {
        let Some(index) = self.tier else {
            return 0;
        };
        match field(entry, index) {
            "Heroic" => 0,
            "Paragon" => 1,
            "Epic" => 2,
            _ => 3,
        }
    }
}

impl ConvertStrategy for FeatStrategy {
    fn name(&self) -> &str {
        "feat"
    }

    fn computed_columns(&self) -> &[&'static str] {
        &[PREREQUISITE]
    }

    fn compute_column(&self, column: &str, data: &str) -> String {
        if column != PREREQUISITE {
            return String::new();
        }
        PREREQUISITE_RE
            .captures(data)
            .map(|caps| caps[1].trim().to_string())
            .unwrap_or_default()
    }

    fn compare(&self, a: &Entry, b: &Entry) -> Ordering {
        self.tier_rank(a)
            .cmp(&self.tier_rank(b))
            .then_with(|| by_name(a, b))
    }
}
