//! Power strategy: level order and a computed usage column.

use std::cmp::Ordering;
use std::sync::LazyLock;

use compendium_shared::Entry;
use regex::Regex;

use super::{ConvertStrategy, by_name, field_index, level};

const USAGE: &str = "Usage";

static USAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<h1 class=(atwill|encounter|daily)power>").expect("valid regex")
});

/// Sorts by the `Level` field when the schema has one, then by name.
pub struct PowerStrategy {
    level: Option<usize>,
}

impl PowerStrategy {
    pub fn new(fields: &[String]) -> Self {
        Self {
            level: field_index(fields, "Level"),
        }
    }
}

impl ConvertStrategy for PowerStrategy {
    fn name(&self) -> &str {
        "power"
    }

    fn computed_columns(&self) -> &[&'static str] {
        &[USAGE]
    }

    fn compute_column(&self, column: &str, data: &str) -> String {
        if column != USAGE {
            return String::new();
        }
        let usage = match USAGE_RE.captures(data).as_ref().map(|caps| &caps[1]) {
            Some("atwill") => "At-Will",
            Some("encounter") => "Encounter",
            Some("daily") => "Daily",
            _ => "",
        };
        usage.to_string()
    }

    fn compare(&self, a: &Entry, b: &Entry) -> Ordering {
        let by_level = match self.level {
            Some(index) => level(a, index).cmp(&level(b, index)),
            None => Ordering::Equal,
        };
        by_level.then_with(|| by_name(a, b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::tests::entry;

    #[test]
    fn usage_comes_from_heading_class() {
        let s = PowerStrategy::new(&[]);
        assert_eq!(s.compute_column(USAGE, "<h1 class=atwillpower>Bash</h1>"), "At-Will");
        assert_eq!(s.compute_column(USAGE, "<h1 class=dailypower>Blast</h1>"), "Daily");
        assert_eq!(s.compute_column(USAGE, "<h1 class=utilitypower>Hop</h1>"), "");
    }

    #[test]
    fn orders_by_level_then_name() {
        let s = PowerStrategy::new(&["Level".into(), "SourceBook".into()]);
        assert_eq!(
            s.compare(&entry("Zap", &["1", "PHB"]), &entry("Arc", &["29", "PHB"])),
            Ordering::Less
        );
        assert_eq!(
            s.compare(&entry("Arc", &["1", "PHB"]), &entry("Zap", &["1", "PHB"])),
            Ordering::Less
        );
    }
}
