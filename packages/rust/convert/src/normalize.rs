//! Markup normalization for raw compendium entries.
//!
//! Each pass is a function `&str -> String` applied in sequence. The order
//! matters: attribute compaction must see unified `<br>` tags, and link removal
//! must see quoted `href` values. Text outside tags is never rewritten, except
//! for whitespace, apostrophes, and the fixed image glyphs.

use std::sync::LazyLock;

use regex::Regex;

/// Bullet images, replaced unconditionally. By far the most common images.
const BULLET_IMAGES: &[(&str, &str)] = &[
    (r#"<img src="images/bullet.gif" alt="">"#, "✦"),
    (r#"<img src="http://www.wizards.com/dnd/images/symbol/x.gif">"#, "✦"),
];

/// Combat, aura, and dice icons. Only scanned for when the text has an image.
const SYMBOL_IMAGES: &[(&str, &str)] = &[
    (r#"<img src="http://www.wizards.com/dnd/images/symbol/S2.gif">"#, "(⚔)"),
    (r#"<img src="http://www.wizards.com/dnd/images/symbol/S3.gif">"#, "(➶)"),
    (r#"<img src="http://www.wizards.com/dnd/images/symbol/Z1.gif">"#, "ᗕ"),
    (r#"<img src="http://www.wizards.com/dnd/images/symbol/Z1a.gif">"#, "ᗕ"),
    (r#"<img src="http://www.wizards.com/dnd/images/symbol/Z2a.gif">"#, "⚔"),
    (r#"<img src="http://www.wizards.com/dnd/images/symbol/Z3a.gif">"#, "➶"),
    (r#"<img src="http://www.wizards.com/dnd/images/symbol/Z4.gif">"#, "✻"),
    (r#"<img src="http://www.wizards.com/dnd/images/symbol/Z4a.gif">"#, "✻"),
    (r#"<img src="http://www.wizards.com/dnd/images/symbol/aura.png" align="top">"#, "☼"),
    (r#"<img src="http://www.wizards.com/dnd/images/symbol/aura.png">"#, "☼"),
    (r#"<img src="http://www.wizards.com/dnd/images/symbol/1a.gif">"#, "⚀"),
    (r#"<img src="http://www.wizards.com/dnd/images/symbol/2a.gif">"#, "⚁"),
    (r#"<img src="http://www.wizards.com/dnd/images/symbol/3a.gif">"#, "⚂"),
    (r#"<img src="http://www.wizards.com/dnd/images/symbol/4a.gif">"#, "⚃"),
    (r#"<img src="http://www.wizards.com/dnd/images/symbol/5a.gif">"#, "⚄"),
    (r#"<img src="http://www.wizards.com/dnd/images/symbol/6a.gif">"#, "⚅"),
];

static SPACES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(" +").expect("valid regex"));

/// Run the full normalization pipeline on raw entry markup.
pub fn normalize(content: &str) -> String {
    let mut result = replace_images(content);

    result = unify_spaces_and_breaks(&result);
    result = collapse_spaces(&result);
    result = result.replace('’', "'");
    result = compact_attributes(&result);
    result = join_stray_line_breaks(&result);
    result = unwrap_site_links(&result);

    result.trim().to_string()
}

/// Collapse runs of literal spaces to one.
pub(crate) fn collapse_spaces(text: &str) -> String {
    SPACES_RE.replace_all(text, " ").into_owned()
}

// ---------------------------------------------------------------------------
// Pass 1: Images to glyphs
// ---------------------------------------------------------------------------

fn replace_images(data: &str) -> String {
    let mut result = data.to_string();
    for (img, glyph) in BULLET_IMAGES {
        result = result.replace(img, glyph);
    }
    if result.contains("<img ") {
        for (img, glyph) in SYMBOL_IMAGES {
            result = result.replace(img, glyph);
        }
    }
    result
}

// ---------------------------------------------------------------------------
// Pass 2: Non-breaking spaces and line breaks
// ---------------------------------------------------------------------------

fn unify_spaces_and_breaks(data: &str) -> String {
    data.replace("&nbsp;", "\u{A0}")
        .replace("<br/>", "<br>")
        .replace("<br />", "<br>")
}

// ---------------------------------------------------------------------------
// Pass 3: Unquote single-word attributes
// ---------------------------------------------------------------------------

/// `<p class="flavor">` becomes `<p class=flavor>`; multi-word values keep their quotes.
fn compact_attributes(data: &str) -> String {
    static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#"<([^<>"]+) (\w+)="(\w+)">"#).expect("valid regex")
    });

    ATTR_RE.replace_all(data, "<$1 $2=$3>").into_owned()
}

// ---------------------------------------------------------------------------
// Pass 4: Stray line breaks next to punctuation
// ---------------------------------------------------------------------------

/// Runs of line breaks go in one step, so a second pass finds nothing to join.
fn join_stray_line_breaks(data: &str) -> String {
    static BEFORE_PUNCT_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\n+([,.])").expect("valid regex"));
    static AFTER_STOP_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\.\n+").expect("valid regex"));

    if !data.contains('\n') {
        return data.to_string();
    }
    let joined = BEFORE_PUNCT_RE.replace_all(data, "$1");
    AFTER_STOP_RE.replace_all(&joined, ".").into_owned()
}

// ---------------------------------------------------------------------------
// Pass 5: Unwrap links to the compendium's own sites
// ---------------------------------------------------------------------------

/// Replace entry, search, and product links with their visible text.
///
/// The `href` may be empty, and `target="_new"` may come before or after it.
fn unwrap_site_links(data: &str) -> String {
    static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(
            r#"<a(?: target="_new")? href="(?:http://ww[w2]\.wizards\.com/[^"]*)?"(?: target="_new")?>([^<]*)</a>"#,
        )
        .expect("valid regex")
    });

    if !data.contains("<a ") {
        return data.to_string();
    }
    LINK_RE.replace_all(data, "$1").into_owned()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
