//! Table of contents command.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use quire_render::{extract_frontmatter, extract_headings, Heading, RenderConfig};

/// Run the toc command.
pub fn run(config: &RenderConfig, file: &Path) -> Result<()> {
    let source = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let (_, body) = extract_frontmatter(&source)
        .with_context(|| format!("Failed to parse {}", file.display()))?;

    print!("{}", outline(&extract_headings(body, &config.toc)));
    Ok(())
}

/// Indented outline, two spaces per level below h1.
fn outline(headings: &[Heading]) -> String {
    let mut out = String::new();
    for heading in headings {
        let indent = "  ".repeat(usize::from(heading.level.saturating_sub(1)));
        out.push_str(&format!("{}{} (#{})\n", indent, heading.text, heading.id));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quire_render::TocOptions;

    #[test]
    fn indents_by_level() {
        let headings = extract_headings(
            "# Intro\n## Getting Started!!\n### Install\n## FAQ\n",
            &TocOptions::default(),
        );

        assert_eq!(
            outline(&headings),
            "Intro (#intro)\n  Getting Started!! (#getting-started)\n    Install (#install)\n  FAQ (#faq)\n"
        );
    }

    #[test]
    fn empty_document_prints_nothing() {
        assert_eq!(outline(&[]), "");
    }
}
