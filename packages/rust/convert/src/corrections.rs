//! Hand-authored fixes for individual entries, and the tally of applied fixes.

use std::collections::HashMap;
use std::sync::{LazyLock, Mutex, MutexGuard};

use compendium_shared::{BLACKLISTED_SHORT_ID, CategoryKind, Entry};
use tracing::debug;

/// A fix for one entry. Runs after normalization, on `data` and `short_id`.
type Fixup = fn(&mut Entry);

/// One-off fixes keyed by category kind, then short id.
static FIXES: LazyLock<HashMap<CategoryKind, HashMap<&'static str, Fixup>>> = LazyLock::new(|| {
    let table: [(CategoryKind, &'static str, Fixup); 3] = [
        // Familiar: an empty monster keyword from Dungeon 211 without a stat block.
        (CategoryKind::Glossary, "glossary679", |entry| {
            entry.short_id = BLACKLISTED_SHORT_ID.to_string();
        }),
        // Granny's Grief
        (CategoryKind::Poison, "poison19", |entry| {
            entry.data = entry
                .data
                .replace(">Published in .<", ">Published in Dungeon Magazine 211.<");
        }),
        // Cambion Stalwart
        (CategoryKind::Monster, "monster2248", |entry| {
            entry.data = entry.data.replace("bit points", "hit points");
        }),
    ];
    let mut fixes: HashMap<CategoryKind, HashMap<&'static str, Fixup>> = HashMap::new();
    for (kind, short_id, fix) in table {
        fixes.entry(kind).or_default().insert(short_id, fix);
    }
    fixes
});

/// Apply the fixes for one entry.
///
/// Kind-wide repairs run on every entry of the kind and are not counted.
/// Returns `true` when an entry-specific fix was applied.
pub fn correct_entry(kind: &CategoryKind, entry: &mut Entry) -> bool {
    if *kind == CategoryKind::Poison {
        // Poisons lack the class on their source paragraph.
        entry.data = entry
            .data
            .replace("<p>Published in", "<p class=publishedIn>Published in");
    }

    let Some(fix) = FIXES
        .get(kind)
        .and_then(|fixes| fixes.get(entry.short_id.as_str()))
    else {
        return false;
    };
    fix(entry);
    debug!(category = %kind, short_id = %entry.short_id, name = %entry.name, "applied correction");
    true
}

// ---------------------------------------------------------------------------
// Tally
// ---------------------------------------------------------------------------

/// An entry that received a one-off fix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correction {
    pub category: String,
    /// Raw id, since a fix may blacklist the short id.
    pub entry_id: String,
}

/// Batch-wide record of applied fixes, shared by concurrent category conversions.
#[derive(Debug, Default)]
pub struct CorrectionTally {
    corrected: Mutex<Vec<Correction>>,
}

impl CorrectionTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, category: &CategoryKind, entry: &Entry) {
        self.lock().push(Correction {
            category: category.to_string(),
            entry_id: entry.id.clone(),
        });
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Copy of the recorded corrections, in recording order.
    pub fn snapshot(&self) -> Vec<Correction> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Correction>> {
        // Records stay valid after a panicking writer.
        self.corrected
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
