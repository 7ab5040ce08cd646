//! Highlight stylesheet command.

use anyhow::Result;
use quire_render::{LanguageRegistry, RenderConfig};

/// Run the css command.
pub fn run(config: &RenderConfig, theme: Option<String>, list: bool) -> Result<()> {
    if list {
        for name in LanguageRegistry::available_themes() {
            println!("{}", name);
        }
        return Ok(());
    }

    let theme = theme.unwrap_or_else(|| config.highlight.theme.clone());
    let css = LanguageRegistry::stylesheet(&theme)?;

    print!("{}", css);
    Ok(())
}
