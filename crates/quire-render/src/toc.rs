//! Table of contents extraction.

use serde::{Deserialize, Serialize};

use crate::fence::FenceTracker;
use crate::slug::slugify;

/// A table of contents entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
    /// Anchor ID, always `slugify(text)`
    pub id: String,
    /// Heading text
    pub text: String,
    /// Heading level (1-6)
    pub level: u8,
}

/// Options for heading extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TocOptions {
    /// Ignore `#` lines inside fenced code blocks.
    ///
    /// Off by default: a shell comment in a code block is then reported as a
    /// heading, which is the behaviour existing documents were written against.
    pub skip_code_blocks: bool,
}

/// Parse a single line as an ATX heading.
///
/// The renderer calls this on the source line of every ATX heading it emits,
/// so the id in the table of contents and the id on the element always agree.
pub fn parse_heading_line(line: &str) -> Option<Heading> {
    let trimmed = line.trim_start();
    let hashes = trimmed.len() - trimmed.trim_start_matches('#').len();
    if hashes == 0 {
        return None;
    }

    let text = strip_closing_sequence(trimmed[hashes..].trim());

    Some(Heading {
        id: slugify(text),
        text: text.to_string(),
        level: hashes.clamp(1, 6) as u8,
    })
}

/// Drop an optional closing run of `#`, as in `## Title ##`.
fn strip_closing_sequence(text: &str) -> &str {
    let without = text.trim_end_matches('#');
    if without.len() == text.len() {
        text
    } else if without.is_empty() || without.ends_with(char::is_whitespace) {
        without.trim_end()
    } else {
        text
    }
}

/// Scan body text for heading lines, in document order.
pub fn extract_headings(body: &str, options: &TocOptions) -> Vec<Heading> {
    let mut fences = FenceTracker::new();

    body.lines()
        .filter(|line| !(fences.observe(line) && options.skip_code_blocks))
        .filter_map(parse_heading_line)
        .collect()
}
