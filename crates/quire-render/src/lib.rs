//! Markdown rendering pipeline for blog posts.
//!
//! Splits YAML frontmatter from the body, builds a table of contents from
//! heading lines, and renders the body to HTML with highlighted code blocks,
//! zoomable images, inline videos and custom container blocks. Heading ids
//! in the table of contents and in the HTML come from the same [`slugify`].

mod autolink;
mod fence;

pub mod config;
pub mod container;
pub mod extension;
pub mod frontmatter;
pub mod highlight;
pub mod media;
pub mod render;
pub mod slug;
pub mod toc;

pub use config::{ConfigError, RenderConfig};
pub use container::{ButtonDirective, ContainerBlocks, ContainerDirective};
pub use extension::{ExtensionTable, Token, TokenHandler, TokenKind};
pub use frontmatter::{extract_frontmatter, FrontMatter, FrontmatterError};
pub use highlight::{CodeHighlighter, LanguageRegistry};
pub use media::{
    render_thumbnail, CallbackHook, DataAttributeHook, InteractionHook, MediaKind,
    MediaReference, MediaResolver,
};
pub use render::{render_document, ParseError, RenderedDocument, Renderer};
pub use slug::slugify;
pub use toc::{extract_headings, Heading, TocOptions};
