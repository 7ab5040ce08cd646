//! Heading slugs.
//!
//! [`slugify`] is the only place heading text is turned into an anchor id.
//! The table of contents and the rendered heading elements both call it, so
//! every TOC link resolves to its heading.

use std::sync::OnceLock;

use regex::Regex;

fn non_word_run() -> &'static Regex {
    static NON_WORD: OnceLock<Regex> = OnceLock::new();
    NON_WORD.get_or_init(|| Regex::new(r"[^A-Za-z0-9_]+").expect("static slug pattern is valid"))
}

/// Convert heading text to a URL-safe anchor id.
///
/// Lowercases the text, collapses every run of characters outside
/// `[A-Za-z0-9_]` into a single `-` and trims hyphens from both ends.
/// Non-ASCII letters count as separators. Distinct headings may share
/// a slug; no suffix is added.
pub fn slugify(text: &str) -> String {
    let lower = text.to_lowercase();
    non_word_run()
        .replace_all(&lower, "-")
        .trim_matches('-')
        .to_string()
}
