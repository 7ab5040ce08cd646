//! Syntax highlighting for fenced code blocks.
//!
//! Languages are registered once in a [`LanguageRegistry`] before any render
//! starts; the registry is then shared read-only by every [`CodeHighlighter`].

use std::collections::BTreeMap;
use std::sync::Arc;

use syntect::highlighting::ThemeSet;
use syntect::html::{css_for_theme_with_class_style, ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use crate::config::ConfigError;

/// CSS class style for highlighted spans. Stylesheets from
/// [`LanguageRegistry::stylesheet`] use the same prefix.
const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "hl-" };

/// Languages registered when no configuration is given.
pub const DEFAULT_LANGUAGES: &[&str] = &["javascript", "go", "bash", "yaml", "json", "python"];

/// Theme used by [`LanguageRegistry::stylesheet`] when none is named.
pub const DEFAULT_THEME: &str = "base16-ocean.dark";

/// Extra names a registered language also answers to.
const ALIASES: &[(&str, &[&str])] = &[
    ("javascript", &["js", "jsx", "mjs", "cjs"]),
    ("go", &["golang"]),
    ("bash", &["sh", "zsh", "shell"]),
    ("yaml", &["yml"]),
    ("json", &["jsonc"]),
    ("python", &["py", "gyp"]),
];

/// Errors from the highlighting backend.
///
/// These never escape a render: the code block falls back to escaped text.
#[derive(Debug, thiserror::Error)]
pub enum HighlightError {
    #[error("Language '{0}' is not registered")]
    UnsupportedLanguage(String),

    #[error("Theme '{0}' is not available")]
    ThemeNotFound(String),

    #[error("Highlighting failed: {0}")]
    Failed(String),
}

/// The set of languages code blocks may be highlighted in.
pub struct LanguageRegistry {
    syntax_set: SyntaxSet,
    /// Lowercase tag -> syntect syntax name
    languages: BTreeMap<String, String>,
}

impl LanguageRegistry {
    /// Register the given languages, plus their well-known aliases.
    pub fn new<S: AsRef<str>>(names: &[S]) -> Result<Self, ConfigError> {
        let syntax_set = SyntaxSet::load_defaults_newlines();
        let mut languages = BTreeMap::new();

        for name in names {
            let tag = name.as_ref().trim().to_lowercase();
            let syntax = syntax_set
                .find_syntax_by_token(&tag)
                .ok_or_else(|| ConfigError::UnknownLanguage(tag.clone()))?;

            let aliases = ALIASES
                .iter()
                .find(|(canonical, _)| *canonical == tag)
                .map(|(_, aliases)| *aliases)
                .unwrap_or_default();

            for alias in aliases {
                languages.insert(alias.to_string(), syntax.name.clone());
            }
            languages.insert(tag, syntax.name.clone());
        }

        tracing::debug!("Registered {} highlight language tags", languages.len());

        Ok(Self {
            syntax_set,
            languages,
        })
    }

    /// Check if a fence tag is registered (case-insensitive).
    pub fn contains(&self, tag: &str) -> bool {
        self.languages.contains_key(&tag.to_lowercase())
    }

    /// All registered tags, aliases included.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.languages.keys().map(String::as_str)
    }

    fn resolve(&self, tag: &str) -> Option<&SyntaxReference> {
        let name = self.languages.get(&tag.to_lowercase())?;
        self.syntax_set.find_syntax_by_name(name)
    }

    /// CSS for the highlighted spans, using a bundled syntect theme.
    pub fn stylesheet(theme: &str) -> Result<String, HighlightError> {
        let themes = ThemeSet::load_defaults();
        let theme = themes
            .themes
            .get(theme)
            .ok_or_else(|| HighlightError::ThemeNotFound(theme.to_string()))?;

        css_for_theme_with_class_style(theme, CLASS_STYLE)
            .map_err(|e| HighlightError::Failed(e.to_string()))
    }

    /// Names of the bundled themes.
    pub fn available_themes() -> Vec<String> {
        let mut names: Vec<String> = ThemeSet::load_defaults().themes.into_keys().collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for LanguageRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LanguageRegistry")
            .field("languages", &self.languages)
            .finish_non_exhaustive()
    }
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_LANGUAGES).expect("default languages ship with syntect")
    }
}

/// Extract the language tag from a fence info string.
///
/// `python title="x.py"` yields `python`; an empty info string yields `None`.
pub fn info_language(info: &str) -> Option<&str> {
    info.split_whitespace()
        .next()
        .map(|tag| tag.split('{').next().unwrap_or(tag))
        .filter(|tag| !tag.is_empty())
}

/// Highlights code against a shared [`LanguageRegistry`].
#[derive(Debug, Clone)]
pub struct CodeHighlighter {
    registry: Arc<LanguageRegistry>,
}

impl CodeHighlighter {
    pub fn new(registry: Arc<LanguageRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &LanguageRegistry {
        &self.registry
    }

    /// Highlight `code` as `language`.
    ///
    /// Returns the inner markup for a `<code>` element, or `None` when the
    /// language is missing, unregistered, or the highlighter fails. Callers
    /// then escape the raw text themselves.
    pub fn highlight(&self, code: &str, language: Option<&str>) -> Option<String> {
        let language = language?;

        match self.try_highlight(code, language) {
            Ok(markup) if !markup.is_empty() => Some(markup),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!("No highlighting for code block: {}", e);
                None
            }
        }
    }

    fn try_highlight(&self, code: &str, language: &str) -> Result<String, HighlightError> {
        let syntax = self
            .registry
            .resolve(language)
            .ok_or_else(|| HighlightError::UnsupportedLanguage(language.to_string()))?;

        let mut generator = ClassedHTMLGenerator::new_with_class_style(
            syntax,
            &self.registry.syntax_set,
            CLASS_STYLE,
        );

        for line in LinesWithEndings::from(code) {
            generator
                .parse_html_for_line_which_includes_newline(line)
                .map_err(|e| HighlightError::Failed(e.to_string()))?;
        }

        Ok(generator.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn highlighter() -> CodeHighlighter {
        CodeHighlighter::new(Arc::new(LanguageRegistry::default()))
    }

    #[test]
    fn registers_default_languages_and_aliases() {
        let registry = LanguageRegistry::default();

        for tag in ["javascript", "js", "go", "bash", "sh", "yaml", "yml", "json", "python", "py"] {
            assert!(registry.contains(tag), "missing {tag}");
        }
        assert!(registry.contains("Python"));
        assert!(!registry.contains("rust"));
    }

    #[test]
    fn rejects_unknown_language_at_registration() {
        let result = LanguageRegistry::new(&["definitely-not-a-language"]);
        assert!(matches!(result, Err(ConfigError::UnknownLanguage(_))));
    }

    #[test]
    fn highlights_registered_language() {
        let code = "def greet(name):\n    return name\n";

        let markup = highlighter().highlight(code, Some("python")).unwrap();

        assert_ne!(markup, code);
        assert!(markup.contains("<span class=\"hl-"));
        assert!(markup.contains("greet"));
    }

    #[test]
    fn escapes_markup_inside_highlighted_code() {
        let markup = highlighter()
            .highlight("const a = \"<b>\";\n", Some("js"))
            .unwrap();

        assert!(markup.contains("&lt;b&gt;"));
        assert!(!markup.contains("<b>"));
    }

    #[test]
    fn unregistered_language_is_unavailable() {
        assert_eq!(highlighter().highlight("fn main() {}", Some("rust")), None);
    }

    #[test]
    fn missing_language_is_unavailable() {
        assert_eq!(highlighter().highlight("plain", None), None);
    }

    #[test]
    fn empty_code_is_unavailable() {
        assert_eq!(highlighter().highlight("", Some("go")), None);
    }

    #[test]
    fn parses_info_language() {
        assert_eq!(info_language("python"), Some("python"));
        assert_eq!(info_language("bash title=\"run.sh\""), Some("bash"));
        assert_eq!(info_language("js{1,3}"), Some("js"));
        assert_eq!(info_language(""), None);
        assert_eq!(info_language("   "), None);
    }

    #[test]
    fn builds_stylesheet_for_bundled_theme() {
        let css = LanguageRegistry::stylesheet(DEFAULT_THEME).unwrap();
        assert!(css.contains(".hl-"));
    }

    #[test]
    fn unknown_theme_errors() {
        let result = LanguageRegistry::stylesheet("no-such-theme");
        assert!(matches!(result, Err(HighlightError::ThemeNotFound(_))));
    }
}
