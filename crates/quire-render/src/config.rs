//! Render configuration.
//!
//! Every field has a default, so an empty config file (or none at all)
//! renders the same way as [`RenderConfig::default`].

use serde::Deserialize;

use crate::highlight::{DEFAULT_LANGUAGES, DEFAULT_THEME};
use crate::toc::TocOptions;

/// Configuration for a [`Renderer`](crate::Renderer).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub markdown: MarkdownOptions,
    pub toc: TocOptions,
    pub highlight: HighlightOptions,
    pub media: MediaOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MarkdownOptions {
    /// Curly quotes, dashes and ellipses.
    pub smart_punctuation: bool,

    /// Turn bare URLs and email addresses into links.
    pub linkify: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            smart_punctuation: true,
            linkify: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HighlightOptions {
    /// Fence tags to highlight; aliases such as `js` or `py` come along.
    pub languages: Vec<String>,

    /// Theme for the exported stylesheet
    pub theme: String,
}

impl Default for HighlightOptions {
    fn default() -> Self {
        Self {
            languages: DEFAULT_LANGUAGES.iter().map(|s| s.to_string()).collect(),
            theme: DEFAULT_THEME.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MediaOptions {
    /// Page function called with `(src, alt)` when an image is clicked.
    /// Without it, images only carry `data-zoom-*` attributes.
    pub zoom_callback: Option<String>,
}

/// Errors in a render configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Unknown highlight language: {0}")]
    UnknownLanguage(String),
}
