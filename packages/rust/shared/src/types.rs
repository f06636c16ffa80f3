//! Core domain types: categories of compendium entries.

use serde::{Deserialize, Serialize};

/// Short id that marks an entry as blacklisted.
///
/// Blacklisted entries skip source resolution and full-text extraction but
/// stay in `entries` and in every count.
pub const BLACKLISTED_SHORT_ID: &str = "null";

// ---------------------------------------------------------------------------
// CategoryKind
// ---------------------------------------------------------------------------

/// Kind tag of a category, which selects its conversion strategy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CategoryKind {
    Ritual,
    Monster,
    Trap,
    Poison,
    Disease,
    Companion,
    Terrain,
    Feat,
    Item,
    Power,
    Glossary,
    /// Any kind without dedicated handling (Race, Class, Deity, ...).
    Other(String),
}

impl CategoryKind {
    /// The tag as it appears in the source data.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Ritual => "Ritual",
            Self::Monster => "Monster",
            Self::Trap => "Trap",
            Self::Poison => "Poison",
            Self::Disease => "Disease",
            Self::Companion => "Companion",
            Self::Terrain => "Terrain",
            Self::Feat => "Feat",
            Self::Item => "Item",
            Self::Power => "Power",
            Self::Glossary => "Glossary",
            Self::Other(tag) => tag,
        }
    }
}

impl From<&str> for CategoryKind {
    fn from(tag: &str) -> Self {
        match tag {
            "Ritual" => Self::Ritual,
            "Monster" => Self::Monster,
            "Trap" => Self::Trap,
            "Poison" => Self::Poison,
            "Disease" => Self::Disease,
            "Companion" => Self::Companion,
            "Terrain" => Self::Terrain,
            "Feat" => Self::Feat,
            "Item" => Self::Item,
            "Power" => Self::Power,
            "Glossary" => Self::Glossary,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for CategoryKind {
    fn from(tag: String) -> Self {
        Self::from(tag.as_str())
    }
}

impl From<CategoryKind> for String {
    fn from(kind: CategoryKind) -> Self {
        kind.as_str().to_string()
    }
}

impl std::fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Entry
// ---------------------------------------------------------------------------

/// One content item within a category (one monster, one power, ...).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Entry {
    /// Raw identifier from the source, e.g. `monster.aspx?id=2248`.
    pub id: String,
    /// Raw display title.
    pub name: String,
    /// Raw markup. Must be present before conversion.
    #[serde(default)]
    pub content: Option<String>,
    /// Raw per-entry values aligned with [`Category::fields`].
    #[serde(default)]
    pub fields: Vec<String>,

    /// `name` with typographic apostrophes normalized.
    #[serde(default)]
    pub display_name: String,
    /// Compact identifier; [`BLACKLISTED_SHORT_ID`] marks a blacklisted entry.
    #[serde(default)]
    pub short_id: String,
    /// Normalized markup.
    #[serde(default)]
    pub data: String,
    /// Plain-text projection of `data` for search indexing.
    #[serde(default)]
    pub fulltext: String,
    /// Per-entry values aligned with [`Category::meta`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Vec<String>>,
}

impl Entry {
    /// Create an unconverted entry.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
        fields: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            content: Some(content.into()),
            fields,
            ..Self::default()
        }
    }

    /// Whether the entry has been blacklisted by a correction.
    pub fn is_blacklisted(&self) -> bool {
        self.short_id == BLACKLISTED_SHORT_ID
    }
}

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// A named group of same-kind entries sharing one field schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    /// Kind tag; also the category's identifier in the source.
    pub id: CategoryKind,
    /// Human-readable name.
    pub name: String,
    /// Ordered raw field names.
    #[serde(default)]
    pub fields: Vec<String>,
    /// Output field names; written once at the start of conversion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Vec<String>>,
    /// Entries in acquisition order.
    #[serde(default)]
    pub entries: Vec<Entry>,
    /// Indices into `entries` in display order; computed once.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sorted: Option<Vec<usize>>,
    /// Number of entries the source reports for this category.
    #[serde(default)]
    pub total_entry_count: usize,
    /// Number of entries that are blacklisted.
    #[serde(default)]
    pub blacklisted_entry_count: usize,
}

impl Category {
    /// Create an empty category of the given kind.
    pub fn new(id: impl Into<CategoryKind>, name: impl Into<String>, fields: Vec<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            fields,
            meta: None,
            entries: Vec::new(),
            sorted: None,
            total_entry_count: 0,
            blacklisted_entry_count: 0,
        }
    }

    /// Position of `field` within the output schema, if present.
    pub fn meta_index(&self, field: &str) -> Option<usize> {
        self.meta.as_ref()?.iter().position(|f| f == field)
    }

    /// Entries in sorted order, once sorting has run.
    pub fn sorted_entries(&self) -> impl Iterator<Item = &Entry> {
        self.sorted
            .iter()
            .flatten()
            .filter_map(|&i| self.entries.get(i))
    }
}
