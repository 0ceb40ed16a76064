//! Canonical text form shared by every comparison stage.
//!
//! Glyph or formatting noise must never turn two copies of the same
//! chapter into "different" content, so both the exact and the near
//! pass compare this form, never the raw text.

use regex::Regex;
use std::sync::LazyLock;

static RE_HORIZONTAL_WS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+").unwrap());
static RE_LINE_EDGES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" *\n *").unwrap());
static RE_MULTI_NEWLINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{2,}").unwrap());
static RE_ADJACENT_BRACKETS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([)\]])([(\[])").unwrap());

/// Typographic quote/bracket variants → canonical ASCII.
fn glyph_map() -> Vec<(&'static str, &'static str)> {
    vec![
        ("\u{201C}", "\""), ("\u{201D}", "\""), ("\u{201E}", "\""),
        ("\u{2018}", "'"), ("\u{2019}", "'"), ("\u{201A}", "'"),
        ("\u{300C}", "["), ("\u{300D}", "]"),
        ("\u{300E}", "["), ("\u{300F}", "]"),
        ("\u{3010}", "["), ("\u{3011}", "]"),
        ("\u{3014}", "["), ("\u{3015}", "]"),
        ("\u{FF08}", "("), ("\u{FF09}", ")"),
    ]
}

/// Map quote and bracket glyph variants to their canonical form.
pub fn normalize_glyphs(text: &str) -> String {
    let mut result = text.to_string();
    for (variant, canonical) in glyph_map() {
        result = result.replace(variant, canonical);
    }
    result
}

/// Canonicalize whitespace, glyphs, and bracket adjacency.
///
/// Idempotent: `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let text = normalize_glyphs(&text);
    let text = RE_HORIZONTAL_WS.replace_all(&text, " ");
    let text = RE_LINE_EDGES.replace_all(&text, "\n");
    let text = RE_MULTI_NEWLINE.replace_all(&text, "\n");
    // Adjacent bracketed asides read as one blob without a break.
    let text = RE_ADJACENT_BRACKETS.replace_all(&text, "$1\n$2");
    text.trim().to_string()
}
