//! Diagnostic checks on converted entries.
//!
//! Findings are advisory: the convertor logs them and carries on. Only runs
//! when debug conversion is enabled.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use compendium_shared::Entry;
use regex::Regex;

/// Tags that must open and close in pairs within `data`.
const PAIRED_TAGS: [&str; 4] = ["p", "span", "b", "i"];

static OPEN_CLOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(/?)(p|span|b|i)\b").expect("valid regex"));

static FULLTEXT_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<\w|\w>|&[^D ]").expect("valid regex"));

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\d+/\d+/\d+\)").expect("valid regex"));

/// A problem spotted in one converted entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    /// Another entry of the category already uses this short id.
    DuplicateShortId { other: String },
    /// Opening and closing counts of a tag differ by `balance`.
    UnbalancedTag { tag: &'static str, balance: i32 },
    /// An `<img>` or `<a>` survived normalization.
    ResidualImageOrLink,
    /// Markup or an entity survived full-text extraction.
    TagInFulltext,
    /// An errata date survived full-text extraction.
    ErrataInFulltext,
    /// Full text does not end with a period. Item144 and Item152 legitimately fail this.
    MissingFullStop,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateShortId { other } => write!(f, "duplicate short id, also used by {other}"),
            Self::UnbalancedTag { tag, balance } => {
                write!(f, "unbalanced <{tag}> open and close ({balance:+})")
            }
            Self::ResidualImageOrLink => f.write_str("unremoved image or link"),
            Self::TagInFulltext => f.write_str("unremoved html tag in fulltext"),
            Self::ErrataInFulltext => f.write_str("unremoved errata date in fulltext"),
            Self::MissingFullStop => f.write_str("fulltext not ending in full stop"),
        }
    }
}

/// Per-category validator; remembers the short ids seen so far.
#[derive(Debug, Default)]
pub struct Validator {
    seen: HashMap<String, String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check one converted entry and return everything found wrong with it.
    pub fn check(&mut self, entry: &Entry) -> Vec<Finding> {
        let mut findings = Vec::new();

        match self.seen.get(&entry.short_id) {
            Some(other) => findings.push(Finding::DuplicateShortId {
                other: other.clone(),
            }),
            None => {
                self.seen
                    .insert(entry.short_id.clone(), entry.name.clone());
            }
        }

        if entry.data.contains("<img ") || entry.data.contains("<a ") {
            findings.push(Finding::ResidualImageOrLink);
        }
        findings.extend(unbalanced_tags(&entry.data));

        if FULLTEXT_TAG_RE.is_match(&entry.fulltext) {
            findings.push(Finding::TagInFulltext);
        }
        if DATE_RE.is_match(&entry.fulltext) {
            findings.push(Finding::ErrataInFulltext);
        }
        if !entry.fulltext.ends_with('.') {
            findings.push(Finding::MissingFullStop);
        }

        findings
    }
}

/// Every paired tag whose opening and closing counts differ.
fn unbalanced_tags(data: &str) -> Vec<Finding> {
    let mut balance = [0i32; PAIRED_TAGS.len()];
    for caps in OPEN_CLOSE_RE.captures_iter(data) {
        let Some(slot) = PAIRED_TAGS.iter().position(|t| *t == &caps[2]) else {
            continue;
        };
        balance[slot] += if caps[1].is_empty() { 1 } else { -1 };
    }

    PAIRED_TAGS
        .into_iter()
        .zip(balance)
        .filter(|(_, b)| *b != 0)
        .map(|(tag, balance)| Finding::UnbalancedTag { tag, balance })
        .collect()
}
