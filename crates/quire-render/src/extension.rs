//! Per-token extension points for the markdown renderer.
//!
//! The renderer hands each heading, fenced code block, image and container
//! line to the handler registered for its [`TokenKind`]. A handler returns
//! the markup to emit, or `None` to fall back to default rendering.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use html_escape::{encode_double_quoted_attribute as attr, encode_text};

use crate::container::ContainerBlocks;
use crate::highlight::CodeHighlighter;
use crate::media::{MediaReference, MediaResolver};

/// Kinds of tokens handlers can be registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Heading,
    FencedCode,
    Image,
    Container,
}

/// A token handed to an extension.
#[derive(Debug, Clone, Copy)]
pub enum Token<'a> {
    /// Start of a heading. The handler renders the opening tag only; the
    /// id is already computed and must be used as given.
    Heading { level: u8, id: &'a str },

    /// A complete fenced code block.
    FencedCode {
        language: Option<&'a str>,
        code: &'a str,
    },

    /// An image, with its alt text flattened.
    Image(&'a MediaReference),

    /// A container opening line.
    ContainerOpen { name: &'a str, params: &'a str },

    /// The closing line of a container opened with `name`.
    ContainerClose { name: &'a str },
}

impl Token<'_> {
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::Heading { .. } => TokenKind::Heading,
            Token::FencedCode { .. } => TokenKind::FencedCode,
            Token::Image(_) => TokenKind::Image,
            Token::ContainerOpen { .. } | Token::ContainerClose { .. } => TokenKind::Container,
        }
    }
}

/// Renders one kind of token.
pub trait TokenHandler: fmt::Debug + Send + Sync {
    /// Markup for `token`, or `None` for default rendering.
    fn render(&self, token: &Token<'_>) -> Option<String>;
}

/// Dispatch table from token kind to handler.
#[derive(Debug, Clone, Default)]
pub struct ExtensionTable {
    handlers: HashMap<TokenKind, Arc<dyn TokenHandler>>,
}

impl ExtensionTable {
    /// An empty table: everything renders as plain CommonMark.
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard handlers for all four token kinds.
    pub fn standard(
        highlighter: CodeHighlighter,
        media: MediaResolver,
        containers: ContainerBlocks,
    ) -> Self {
        let mut table = Self::new();
        table.register(TokenKind::Heading, HeadingAnchors);
        table.register(TokenKind::FencedCode, highlighter);
        table.register(TokenKind::Image, media);
        table.register(TokenKind::Container, containers);
        table
    }

    /// Set the handler for `kind`, replacing any previous one.
    pub fn register(&mut self, kind: TokenKind, handler: impl TokenHandler + 'static) {
        self.handlers.insert(kind, Arc::new(handler));
    }

    /// Remove the handler for `kind`.
    pub fn unregister(&mut self, kind: TokenKind) {
        self.handlers.remove(&kind);
    }

    pub fn dispatch(&self, token: &Token<'_>) -> Option<String> {
        self.handlers.get(&token.kind())?.render(token)
    }
}

/// Opening tags with the computed anchor id.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadingAnchors;

impl TokenHandler for HeadingAnchors {
    fn render(&self, token: &Token<'_>) -> Option<String> {
        match token {
            Token::Heading { level, id } => Some(format!("<h{} id=\"{}\">", level, attr(id))),
            _ => None,
        }
    }
}

impl TokenHandler for CodeHighlighter {
    fn render(&self, token: &Token<'_>) -> Option<String> {
        let Token::FencedCode { language, code } = token else {
            return None;
        };

        let markup = self.highlight(code, *language)?;
        let class = language
            .map(|lang| format!(" class=\"language-{}\"", attr(lang)))
            .unwrap_or_default();

        Some(format!("<pre><code{}>{}</code></pre>\n", class, markup))
    }
}

impl TokenHandler for MediaResolver {
    fn render(&self, token: &Token<'_>) -> Option<String> {
        match token {
            Token::Image(media) => Some(self.resolve(media)),
            _ => None,
        }
    }
}

impl TokenHandler for ContainerBlocks {
    fn render(&self, token: &Token<'_>) -> Option<String> {
        match token {
            Token::ContainerOpen { name, params } => self.open(name, params),
            Token::ContainerClose { name } => self.close(name),
            _ => None,
        }
    }
}

/// Escaped plain code block, the fallback for unhighlighted fences.
pub(crate) fn plain_code_block(language: Option<&str>, code: &str) -> String {
    let class = language
        .map(|lang| format!(" class=\"language-{}\"", attr(lang)))
        .unwrap_or_default();

    format!("<pre><code{}>{}</code></pre>\n", class, encode_text(code))
}
