//! Category conversion: normalize, correct, resolve sources, and index every entry.

use compendium_shared::{Category, CategoryKind, CompendiumError, Entry, Result};
use tracing::{debug, instrument, warn};

use crate::corrections::{self, CorrectionTally};
use crate::source_book::{SourceBook, SourceBookResolver};
use crate::strategy::{self, ConvertStrategy};
use crate::validator::Validator;
use crate::{fulltext, normalize};

/// URL fragment removed from raw ids to form short ids.
const ID_SUFFIX: &str = ".aspx?id=";

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Receives one notification per converted entry, in processing order.
pub trait ProgressSink: Send + Sync {
    fn entry_completed(&self);
}

/// No-op progress sink for headless/test usage.
pub struct SilentProgress;

impl ProgressSink for SilentProgress {
    fn entry_completed(&self) {}
}

// ---------------------------------------------------------------------------
// Convertor
// ---------------------------------------------------------------------------

/// Converts the entries of one category.
///
/// Holds per-category scratch state (learned book titles, seen short ids), so
/// a convertor must not be shared between categories.
pub struct Convertor {
    kind: CategoryKind,
    strategy: Box<dyn ConvertStrategy>,
    books: SourceBookResolver,
    validator: Option<Validator>,
}

impl Convertor {
    /// Select the strategy for `category`. With `debug`, every entry is validated.
    pub fn for_category(category: &Category, debug: bool) -> Self {
        Self {
            kind: category.id.clone(),
            strategy: strategy::strategy_for(category),
            books: SourceBookResolver::new(),
            validator: debug.then(Validator::new),
        }
    }

    pub fn strategy_name(&self) -> &str {
        self.strategy.name()
    }

    /// Convert every entry of `category` in place, then sort it.
    ///
    /// Fails on the first entry without content, and when the sorted entry
    /// count disagrees with `total_entry_count`.
    #[instrument(skip_all, fields(category = %category.id, strategy = self.strategy.name()))]
    pub fn convert(
        &mut self,
        category: &mut Category,
        progress: &dyn ProgressSink,
        tally: &CorrectionTally,
    ) -> Result<()> {
        if category.meta.is_none() {
            category.meta = Some(self.initialise(&category.fields));
        }
        let computed = self.computed_slots(category);
        let schema_len = category.meta.as_ref().map_or(0, Vec::len);

        for entry in &mut category.entries {
            if entry.content.is_none() {
                return Err(CompendiumError::MissingContent {
                    entry: entry.name.clone(),
                    category: category.name.clone(),
                });
            }
            if self.convert_entry(entry, &computed, schema_len) {
                tally.record(&category.id, entry);
            }
            progress.entry_completed();
        }

        if category.sorted.is_none() {
            category.sorted = Some(self.sort(&category.entries));
        }

        let sorted = category.sorted.as_ref().map_or(0, Vec::len);
        if sorted != category.total_entry_count {
            return Err(CompendiumError::CountMismatch {
                category: category.name.clone(),
                sorted,
                total: category.total_entry_count,
            });
        }

        debug!(entries = category.entries.len(), "category converted");
        Ok(())
    }

    /// Output schema: the raw fields with computed columns before the source column.
    fn initialise(&self, fields: &[String]) -> Vec<String> {
        let mut meta = fields.to_vec();
        let Some(source) = fields.len().checked_sub(1) else {
            return meta;
        };
        for (offset, column) in self.strategy.computed_columns().iter().enumerate() {
            meta.insert(source + offset, column.to_string());
        }
        meta
    }

    /// Computed columns present in the category schema, with their positions.
    fn computed_slots(&self, category: &Category) -> Vec<(usize, &'static str)> {
        let mut slots: Vec<_> = self
            .strategy
            .computed_columns()
            .iter()
            .filter_map(|&column| Some((category.meta_index(column)?, column)))
            .collect();
        slots.sort_unstable();
        slots
    }

    /// Convert one entry. Returns `true` if a one-off correction was applied.
    ///
    /// Entry meta shorter than the category schema by the computed columns,
    /// whether fresh or preset, gets them filled from the corrected data.
    fn convert_entry(
        &mut self,
        entry: &mut Entry,
        computed: &[(usize, &'static str)],
        schema_len: usize,
    ) -> bool {
        entry.display_name = entry.name.replace('’', "'");
        entry.short_id = entry.id.replace(ID_SUFFIX, "");
        if entry.meta.is_none() {
            entry.meta = Some(entry.fields.clone());
        }
        let meta_len = entry.meta.as_ref().map_or(0, Vec::len);
        entry.data = normalize::normalize(entry.content.as_deref().unwrap_or_default());

        let corrected = corrections::correct_entry(&self.kind, entry);

        if !computed.is_empty() && meta_len + computed.len() == schema_len {
            self.fill_computed(entry, computed);
        } else if meta_len != schema_len {
            warn!(short_id = %entry.short_id, meta_len, schema_len, "entry meta does not match category schema");
        }

        if entry.is_blacklisted() {
            debug!(id = %entry.id, name = %entry.name, "entry blacklisted");
            return corrected;
        }

        self.write_source(entry);
        entry.fulltext = fulltext::extract(&entry.data);

        if let Some(validator) = self.validator.as_mut() {
            for finding in validator.check(entry) {
                warn!(short_id = %entry.short_id, name = %entry.name, "{finding}");
            }
        }
        corrected
    }

    fn fill_computed(&self, entry: &mut Entry, computed: &[(usize, &'static str)]) {
        let values: Vec<String> = computed
            .iter()
            .map(|&(_, column)| self.strategy.compute_column(column, &entry.data))
            .collect();
        let Some(meta) = entry.meta.as_mut() else {
            return;
        };
        for (&(slot, _), value) in computed.iter().zip(values) {
            meta.insert(slot.min(meta.len()), value);
        }
    }

    /// Store the resolved source book in the last meta slot.
    fn write_source(&mut self, entry: &mut Entry) {
        let SourceBook::Resolved(source) =
            self.books.resolve(&entry.data, &entry.short_id, &entry.name)
        else {
            return;
        };
        match entry.meta.as_mut().and_then(|meta| meta.last_mut()) {
            Some(slot) => *slot = source,
            None => debug!(short_id = %entry.short_id, source, "no source column for resolved source"),
        }
    }

    /// Indices of `entries` in display order. Ties keep acquisition order.
    fn sort(&self, entries: &[Entry]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..entries.len()).collect();
        order.sort_by(|&a, &b| self.strategy.compare(&entries[a], &entries[b]));
        order
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct CountingProgress(AtomicUsize);

    impl ProgressSink for CountingProgress {
        fn entry_completed(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn category(kind: &str, fields: &[&str], entries: Vec<Entry>) -> Category {
        let mut category = Category::new(
            kind,
            format!("{kind}s"),
            fields.iter().map(|f| f.to_string()).collect(),
        );
        category.total_entry_count = entries.len();
        category.entries = entries;
        category
    }

    fn entry(id: &str, name: &str, content: &str, fields: &[&str]) -> Entry {
        Entry::new(
            id,
            name,
            content,
            fields.iter().map(|f| f.to_string()).collect(),
        )
    }

    fn convert(category: &mut Category, debug: bool) -> Result<CorrectionTally> {
        let tally = CorrectionTally::new();
        Convertor::for_category(category, debug).convert(category, &SilentProgress, &tally)?;
        Ok(tally)
    }

    #[test]
    fn entry_fields_are_derived() {
        let mut cat = category(
            "Deity",
            &["Alignment", "SourceBook"],
            vec![entry(
                "deity.aspx?id=12",
                "Bahamut’s Grace",
                r#"<h1 class="player">Bahamut’s Grace</h1><p class="flavor">Lawful  good.</p><p class="publishedIn">Published in <a href="http://www.wizards.com/dnd/phb" target="_new">Player's Handbook</a>, page 20.</p>"#,
                &["Lawful Good", ""],
            )],
        );
        convert(&mut cat, false).expect("convert");

        let e = &cat.entries[0];
        assert_eq!(e.display_name, "Bahamut's Grace");
        assert_eq!(e.short_id, "deity12");
        assert_eq!(
            e.data,
            "<h1 class=player>Bahamut's Grace</h1><p class=flavor>Lawful good.</p><p class=publishedIn>Published in Player's Handbook, page 20.</p>"
        );
        assert_eq!(e.fulltext, "Bahamut's Grace Lawful good.");
        assert_eq!(e.meta.as_deref(), Some(&["Lawful Good".to_string(), "PHB".to_string()][..]));
        assert_eq!(cat.meta, Some(vec!["Alignment".to_string(), "SourceBook".to_string()]));
    }

    #[test]
    fn adventurers_vault_resolves_to_av() {
        let mut cat = category(
            "Item",
            &["Level", "SourceBook"],
            vec![entry(
                "item.aspx?id=7",
                "Bag of Holding",
                r#"<h1 class="mihead">Bag of Holding</h1><p class="mistat"><b>Item Slot</b>: Waist</p><p class="publishedIn">Published in Adventurer's Vault, page 10.</p>"#,
                &["5", ""],
            )],
        );
        convert(&mut cat, false).expect("convert");

        assert_eq!(
            cat.meta,
            Some(vec!["Level".to_string(), "Slot".to_string(), "SourceBook".to_string()])
        );
        let meta = cat.entries[0].meta.as_ref().expect("meta");
        assert_eq!(meta, &["5", "Waist", "AV"]);
    }

    #[test]
    fn class_compendium_alone_resolves_to_cc() {
        let mut cat = category(
            "Feat",
            &["Tier", "SourceBook"],
            vec![entry(
                "feat.aspx?id=3",
                "Hunter's Aim",
                r#"<h1 class="feat">Hunter's Aim</h1><p class="publishedIn">Published in Class Compendium.</p>"#,
                &["Heroic", ""],
            )],
        );
        convert(&mut cat, false).expect("convert");

        let meta = cat.entries[0].meta.as_ref().expect("meta");
        assert_eq!(meta.last().map(String::as_str), Some("CC"));
        assert_eq!(meta.len(), cat.meta.as_ref().map_or(0, Vec::len));
    }

    #[test]
    fn glossary679_ends_blacklisted_but_counted() {
        let mut cat = category(
            "Glossary",
            &["Type", "SourceBook"],
            vec![
                entry("glossary.aspx?id=679", "Familiar", "<p>Familiar</p>", &["Keyword", ""]),
                entry(
                    "glossary.aspx?id=1",
                    "Aura",
                    r#"<p>An aura.</p><p class="publishedIn">Published in Rules Compendium, page 5.</p>"#,
                    &["Rules", ""],
                ),
            ],
        );
        let tally = convert(&mut cat, true).expect("convert");

        let familiar = &cat.entries[0];
        assert_eq!(familiar.short_id, "null");
        assert!(familiar.fulltext.is_empty());
        assert_eq!(familiar.meta.as_ref().expect("meta")[1], "");
        assert_eq!(cat.entries[1].fulltext, "An aura.");
        assert_eq!(cat.sorted, Some(vec![1, 0]));
        assert_eq!(tally.len(), 1);
    }

    #[test]
    fn missing_content_names_entry_and_category() {
        let mut broken = entry("monster.aspx?id=1", "Kobold", "", &["1", ""]);
        broken.content = None;
        let mut cat = category("Monster", &["Level", "SourceBook"], vec![broken]);

        let err = convert(&mut cat, false).unwrap_err();
        assert!(matches!(err, CompendiumError::MissingContent { .. }));
        assert_eq!(err.to_string(), "Kobold (Monsters) has no content");
    }

    #[test]
    fn count_mismatch_is_fatal() {
        let mut cat = category(
            "Trap",
            &["Level", "SourceBook"],
            vec![entry("trap.aspx?id=1", "Pit", "<p>Pit.</p>", &["1", ""])],
        );
        cat.total_entry_count = 2;

        let err = convert(&mut cat, false).unwrap_err();
        assert!(matches!(
            err,
            CompendiumError::CountMismatch { sorted: 1, total: 2, .. }
        ));
    }

    #[test]
    fn leveled_sort_is_stable_and_leaves_entries_in_place() {
        let mut cat = category(
            "Monster",
            &["Level", "SourceBook"],
            vec![
                entry("monster.aspx?id=1", "Orc", "<p>a.</p>", &["3", ""]),
                entry("monster.aspx?id=2", "Rat", "<p>b.</p>", &["1", ""]),
                entry("monster.aspx?id=3", "Orc", "<p>c.</p>", &["3", ""]),
                entry("monster.aspx?id=4", "Ant", "<p>d.</p>", &["3", ""]),
            ],
        );
        convert(&mut cat, false).expect("convert");

        assert_eq!(cat.sorted, Some(vec![1, 3, 0, 2]));
        let ids: Vec<_> = cat.entries.iter().map(|e| e.short_id.as_str()).collect();
        assert_eq!(ids, ["monster1", "monster2", "monster3", "monster4"]);
    }

    #[test]
    fn progress_is_signalled_per_entry() {
        let mut cat = category(
            "Companion",
            &["Type", "SourceBook"],
            vec![
                entry("companion.aspx?id=1", "Wolf", "<p>w.</p>", &["Beast", ""]),
                entry("companion.aspx?id=2", "Hawk", "<p>h.</p>", &["Beast", ""]),
            ],
        );
        let progress = CountingProgress(AtomicUsize::new(0));
        let tally = CorrectionTally::new();
        Convertor::for_category(&cat, false)
            .convert(&mut cat, &progress, &tally)
            .expect("convert");

        assert_eq!(progress.0.load(Ordering::SeqCst), 2);
        assert_eq!(cat.sorted, Some(vec![1, 0]));
    }

    #[test]
    fn preset_meta_and_sort_are_kept() {
        let mut cat = category(
            "Power",
            &["Level", "SourceBook"],
            vec![entry(
                "power.aspx?id=9",
                "Cleave",
                "<h1 class=atwillpower>Cleave</h1>",
                &["1", "PHB"],
            )],
        );
        cat.meta = Some(vec!["Level".into(), "SourceBook".into()]);
        cat.sorted = Some(vec![0]);
        convert(&mut cat, false).expect("convert");

        assert_eq!(cat.meta, Some(vec!["Level".to_string(), "SourceBook".to_string()]));
        assert_eq!(cat.entries[0].meta.as_ref().expect("meta"), &["1", "PHB"]);
    }

    #[test]
    fn power_usage_column_is_filled() {
        let mut cat = category(
            "Power",
            &["Level", "SourceBook"],
            vec![entry(
                "power.aspx?id=9",
                "Cleave",
                r#"<h1 class="atwillpower">Cleave</h1><p class="flavor"><i>Swing wide.</i></p><p>Hit.</p>"#,
                &["1", "PHB"],
            )],
        );
        convert(&mut cat, false).expect("convert");

        let e = &cat.entries[0];
        assert_eq!(e.meta.as_ref().expect("meta"), &["1", "At-Will", "PHB"]);
        assert_eq!(e.fulltext, "Cleave Hit.");
    }

    #[test]
    fn preset_and_fresh_entry_meta_end_up_the_same_length() {
        let mut preset = entry(
            "power.aspx?id=2",
            "Brute Strike",
            r#"<h1 class="dailypower">Brute Strike</h1><p class="publishedIn">Published in Player's Handbook, page 77.</p>"#,
            &["1", ""],
        );
        preset.meta = Some(vec!["1".into(), String::new()]);
        let mut cat = category(
            "Power",
            &["Level", "SourceBook"],
            vec![
                entry(
                    "power.aspx?id=1",
                    "Cleave",
                    r#"<h1 class="atwillpower">Cleave</h1><p class="publishedIn">Published in Player's Handbook, page 76.</p>"#,
                    &["1", ""],
                ),
                preset,
            ],
        );
        convert(&mut cat, false).expect("convert");

        assert_eq!(
            cat.meta,
            Some(vec!["Level".to_string(), "Usage".to_string(), "SourceBook".to_string()])
        );
        assert_eq!(cat.entries[0].meta.as_ref().expect("meta"), &["1", "At-Will", "PHB"]);
        assert_eq!(cat.entries[1].meta.as_ref().expect("meta"), &["1", "Daily", "PHB"]);
    }

    #[test]
    fn full_length_preset_entry_meta_is_kept() {
        let mut e = entry(
            "power.aspx?id=3",
            "Twin Strike",
            "<h1 class=atwillpower>Twin Strike</h1>",
            &["1", "PHB"],
        );
        e.meta = Some(vec!["1".into(), "Encounter".into(), "PHB".into()]);
        let mut cat = category("Power", &["Level", "SourceBook"], vec![e]);
        convert(&mut cat, false).expect("convert");

        assert_eq!(cat.entries[0].meta.as_ref().expect("meta"), &["1", "Encounter", "PHB"]);
    }

    struct HitPointsStrategy;

    impl ConvertStrategy for HitPointsStrategy {
        fn name(&self) -> &str {
            "hit-points"
        }

        fn computed_columns(&self) -> &[&'static str] {
            &["HP"]
        }

        fn compute_column(&self, _column: &str, data: &str) -> String {
            let value = if data.contains("hit points") { "hit" } else { "miss" };
            value.to_string()
        }
    }

    #[test]
    fn computed_columns_see_corrected_data() {
        let mut cat = category(
            "Monster",
            &["Level", "SourceBook"],
            vec![entry(
                "monster.aspx?id=2248",
                "Cambion Stalwart",
                "<p>45 bit points.</p>",
                &["10", ""],
            )],
        );
        let mut convertor = Convertor {
            kind: CategoryKind::Monster,
            strategy: Box::new(HitPointsStrategy),
            books: SourceBookResolver::new(),
            validator: None,
        };
        let tally = CorrectionTally::new();
        convertor
            .convert(&mut cat, &SilentProgress, &tally)
            .expect("convert");

        assert_eq!(cat.meta.as_ref().expect("meta")[1], "HP");
        assert_eq!(cat.entries[0].meta.as_ref().expect("meta")[1], "hit");
        assert_eq!(tally.len(), 1);
    }

    #[test]
    fn blacklisted_entry_still_gets_computed_columns() {
        let mut cat = category(
            "Glossary",
            &["Type", "SourceBook"],
            vec![entry("glossary.aspx?id=679", "Familiar", "<p>Familiar</p>", &["Keyword", ""])],
        );
        let mut convertor = Convertor {
            kind: CategoryKind::Glossary,
            strategy: Box::new(HitPointsStrategy),
            books: SourceBookResolver::new(),
            validator: None,
        };
        convertor
            .convert(&mut cat, &SilentProgress, &CorrectionTally::new())
            .expect("convert");

        let e = &cat.entries[0];
        assert!(e.is_blacklisted());
        assert_eq!(e.meta.as_ref().map(Vec::len), cat.meta.as_ref().map(Vec::len));
    }

    // `&gt;` is the one way a `>` reaches fulltext; none of these entries use it.
    #[test]
    fn fulltext_has_no_delimiters_from_markup() {
        let mut cat = category(
            "Monster",
            &["Level", "SourceBook"],
            vec![
                entry(
                    "monster.aspx?id=2248",
                    "Cambion Stalwart",
                    r#"<h1 class="monster">Cambion Stalwart</h1><p>HP 90; 45 bit points when bloodied.<br/>Update (4/15/2009)<br/>Changed HP.</p><p class="publishedIn">Published in Monster Manual 2, page 30.</p>"#,
                    &["10", ""],
                ),
                entry(
                    "monster.aspx?id=5",
                    "Imp",
                    r#"<p><img src="http://www.wizards.com/dnd/images/symbol/S2.gif"> Bite&nbsp;(poison) <a target="_new" href="http://ww2.wizards.com/dnd/insider/item.aspx?fid=3">more</a></p>"#,
                    &["3", ""],
                ),
            ],
        );
        let tally = convert(&mut cat, true).expect("convert");

        for e in &cat.entries {
            assert!(!e.fulltext.contains('<'), "{}", e.fulltext);
            assert!(!e.fulltext.contains('>'), "{}", e.fulltext);
        }
        assert_eq!(cat.entries[0].fulltext, "Cambion Stalwart HP 90; 45 hit points when bloodied.");
        assert_eq!(cat.entries[0].meta.as_ref().expect("meta")[1], "MM2");
        assert_eq!(cat.entries[1].fulltext, "(⚔) Bite (poison) more");
        assert_eq!(tally.len(), 1);
    }
}
