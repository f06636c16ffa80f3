//! Plain-text projection of normalized markup for full-text search.

use std::sync::LazyLock;

use regex::Regex;

use crate::normalize::collapse_spaces;

/// Convert normalized entry markup into search text.
///
/// Flavor text, the source paragraph, and errata notes are dropped; every
/// remaining tag, comment, or declaration becomes a space. The result never
/// contains `<` or `>` from markup; `&gt;` in the data is still unescaped to `>`.
pub fn extract(data: &str) -> String {
    let mut text = strip_flavor(data);
    text = strip_published(&text);
    text = strip_errata(&text);

    text = text.replace('\u{A0}', " ");
    text = strip_tags(&text);
    text = collapse_spaces(&text);

    // The compendium uses very few entities.
    text = text.replace("&amp;", "&").replace("&gt;", ">");

    text.trim().to_string()
}

/// Keep power and item headings but drop the italic flavor paragraph after them.
fn strip_flavor(data: &str) -> String {
    static POWER_FLAVOR_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(<h1 class=\w{5,9}power>.*?</h1>)<p class=flavor><i>[^>]+</i></p>")
            .expect("valid regex")
    });
    static ITEM_FLAVOR_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(<h1 class=mihead>.*?</h1>)<p class=miflavor>[^>]+</p>")
            .expect("valid regex")
    });

    let mut result = data.to_string();
    if result.find("power>").is_some_and(|at| at > 0) {
        result = POWER_FLAVOR_RE.replace_all(&result, "$1").into_owned();
    }
    if result.find("mihead>").is_some_and(|at| at > 0) {
        result = ITEM_FLAVOR_RE.replace_all(&result, "$1").into_owned();
    }
    result
}

fn strip_published(data: &str) -> String {
    static PUBLISHED_PARA_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"<p class=publishedIn>Published in[^<>]*</p>").expect("valid regex")
    });

    PUBLISHED_PARA_RE.replace_all(data, "").into_owned()
}

/// Errata look like `<br>Update (4/15/2009)<br>Changed damage.`; the action word may be empty.
fn strip_errata(data: &str) -> String {
    static ERRATA_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"<br>\w* \([123]?\d/[123]?\d/20[01]\d\)<br>[^<]*").expect("valid regex")
    });

    ERRATA_RE.replace_all(data, " ").into_owned()
}

fn strip_tags(data: &str) -> String {
    static COMMENT_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"));
    static TAG_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"<[^<>]*>").expect("valid regex"));

    let text = COMMENT_RE.replace_all(data, " ");
    TAG_RE.replace_all(&text, " ").into_owned()
}
