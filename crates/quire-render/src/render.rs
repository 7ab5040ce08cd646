//! Document rendering.

use std::borrow::Cow;
use std::ops::Range;
use std::sync::{Arc, OnceLock};

use linkify::LinkFinder;
use pulldown_cmark::{
    html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd, TextMergeWithOffset,
};
use serde::Serialize;

use crate::autolink::autolink;
use crate::config::{ConfigError, RenderConfig};
use crate::container::{closing_marker_len, parse_opening, ContainerBlocks};
use crate::extension::{plain_code_block, ExtensionTable, Token};
use crate::fence::FenceTracker;
use crate::frontmatter::{extract_frontmatter, FrontMatter, FrontmatterError};
use crate::highlight::{info_language, CodeHighlighter, LanguageRegistry};
use crate::media::{CallbackHook, DataAttributeHook, InteractionHook, MediaReference, MediaResolver};
use crate::slug::slugify;
use crate::toc::{extract_headings, parse_heading_line, Heading, TocOptions};

/// A rendered document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedDocument {
    /// Parsed frontmatter (empty if absent)
    pub front_matter: FrontMatter,

    /// Table of contents entries
    pub toc: Vec<Heading>,

    /// Body HTML fragment
    pub html: String,
}

/// Errors that can occur when rendering a document.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Frontmatter error: {0}")]
    Frontmatter(#[from] FrontmatterError),
}

/// Turns raw documents into [`RenderedDocument`]s.
///
/// A renderer holds no per-document state and is `Send + Sync`; build one
/// up front and share it across threads.
#[derive(Debug, Clone)]
pub struct Renderer {
    options: Options,
    linkify: bool,
    toc: TocOptions,
    extensions: ExtensionTable,
}

impl Renderer {
    /// Build a renderer, registering the configured highlight languages.
    pub fn new(config: &RenderConfig) -> Result<Self, ConfigError> {
        let registry = Arc::new(LanguageRegistry::new(&config.highlight.languages)?);

        let hook: Arc<dyn InteractionHook> = match &config.media.zoom_callback {
            Some(function) => Arc::new(CallbackHook::new(function.as_str())),
            None => Arc::new(DataAttributeHook),
        };

        let extensions = ExtensionTable::standard(
            CodeHighlighter::new(registry),
            MediaResolver::new(hook),
            ContainerBlocks::default(),
        );

        let mut options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS;

        if config.markdown.smart_punctuation {
            options |= Options::ENABLE_SMART_PUNCTUATION;
        }

        Ok(Self {
            options,
            linkify: config.markdown.linkify,
            toc: config.toc.clone(),
            extensions,
        })
    }

    /// The extension table, for registering custom handlers.
    pub fn extensions_mut(&mut self) -> &mut ExtensionTable {
        &mut self.extensions
    }

    /// Render a document: frontmatter, table of contents and HTML.
    ///
    /// Fails only on a malformed frontmatter block; no partial output is
    /// produced in that case.
    pub fn render(&self, source: &str) -> Result<RenderedDocument, ParseError> {
        let (front_matter, body) = extract_frontmatter(source)?;

        Ok(RenderedDocument {
            front_matter,
            toc: extract_headings(body, &self.toc),
            html: self.render_body(body),
        })
    }

    /// Render a markdown body (no frontmatter) to an HTML fragment.
    pub fn render_body(&self, body: &str) -> String {
        let source = self.rewrite_containers(body);
        let parser =
            TextMergeWithOffset::new(Parser::new_ext(&source, self.options).into_offset_iter());
        let finder = LinkFinder::new();

        let mut events: Vec<Event<'_>> = Vec::new();
        let mut heading: Option<PendingHeading<'_>> = None;
        let mut code: Option<PendingCode> = None;
        let mut image: Option<PendingImage<'_>> = None;
        let mut link_depth = 0usize;
        let mut indented_code = false;

        for (event, range) in parser {
            // Everything inside an image is alt text.
            if let Some(pending) = image.as_mut() {
                match event {
                    Event::Start(Tag::Image { .. }) => pending.depth += 1,
                    Event::End(TagEnd::Image) if pending.depth > 0 => pending.depth -= 1,
                    Event::End(TagEnd::Image) => {
                        if let Some(done) = image.take() {
                            let rendered = self.finish_image(done);
                            push(&mut events, &mut heading, rendered);
                        }
                    }
                    Event::Text(text) | Event::Code(text) => pending.alt.push_str(&text),
                    Event::SoftBreak | Event::HardBreak => pending.alt.push(' '),
                    _ => {}
                }
                continue;
            }

            match event {
                Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) => {
                    code = Some(PendingCode {
                        info: info.to_string(),
                        text: String::new(),
                    });
                }
                Event::Text(text) if code.is_some() => {
                    if let Some(pending) = code.as_mut() {
                        pending.text.push_str(&text);
                    }
                }
                Event::End(TagEnd::CodeBlock) if code.is_some() => {
                    if let Some(done) = code.take() {
                        events.push(Event::Html(self.finish_code(&done).into()));
                    }
                }
                event @ Event::Start(Tag::CodeBlock(CodeBlockKind::Indented)) => {
                    indented_code = true;
                    events.push(event);
                }
                event @ Event::End(TagEnd::CodeBlock) => {
                    indented_code = false;
                    events.push(event);
                }

                event @ Event::Start(Tag::Link { .. }) => {
                    link_depth += 1;
                    push(&mut events, &mut heading, [event]);
                }
                event @ Event::End(TagEnd::Link) => {
                    link_depth = link_depth.saturating_sub(1);
                    push(&mut events, &mut heading, [event]);
                }
                Event::InlineHtml(markup) => {
                    if is_anchor_open(&markup) {
                        link_depth += 1;
                    } else if is_anchor_close(&markup) {
                        link_depth = link_depth.saturating_sub(1);
                    }
                    push(&mut events, &mut heading, [Event::InlineHtml(markup)]);
                }
                Event::Text(text) if self.linkify && link_depth == 0 && !indented_code => {
                    push(&mut events, &mut heading, autolink(&finder, &text));
                }

                Event::Start(Tag::Image {
                    link_type,
                    dest_url,
                    title,
                    id,
                }) => {
                    image = Some(PendingImage {
                        start: Tag::Image {
                            link_type,
                            dest_url,
                            title,
                            id,
                        },
                        alt: String::new(),
                        depth: 0,
                    });
                }

                Event::Start(Tag::Heading {
                    level,
                    classes,
                    attrs,
                    ..
                }) => {
                    heading = Some(PendingHeading {
                        level: level as u8,
                        classes,
                        attrs,
                        range,
                        inner: Vec::new(),
                    });
                }
                Event::End(TagEnd::Heading(level)) => {
                    if let Some(done) = heading.take() {
                        let id = heading_id(&source, &done);
                        let open = self.extensions.dispatch(&Token::Heading {
                            level: done.level,
                            id: &id,
                        });

                        match open {
                            Some(markup) => events.push(Event::Html(markup.into())),
                            None => events.push(Event::Start(Tag::Heading {
                                level,
                                id: Some(id.into()),
                                classes: done.classes,
                                attrs: done.attrs,
                            })),
                        }
                        events.extend(done.inner);
                    }
                    events.push(Event::End(TagEnd::Heading(level)));
                }

                other => push(&mut events, &mut heading, [other]),
            }
        }

        let mut output = String::with_capacity(source.len() * 3 / 2);
        html::push_html(&mut output, events.into_iter());
        output
    }

    fn finish_code(&self, code: &PendingCode) -> String {
        let language = info_language(&code.info);

        self.extensions
            .dispatch(&Token::FencedCode {
                language,
                code: &code.text,
            })
            .unwrap_or_else(|| plain_code_block(language, &code.text))
    }

    fn finish_image<'a>(&self, image: PendingImage<'a>) -> Vec<Event<'a>> {
        let Tag::Image { ref dest_url, .. } = image.start else {
            return Vec::new();
        };
        let media = MediaReference::new(dest_url.to_string(), image.alt.as_str());

        match self.extensions.dispatch(&Token::Image(&media)) {
            Some(markup) => vec![Event::InlineHtml(markup.into())],
            None => vec![
                Event::Start(image.start),
                Event::Text(CowStr::from(image.alt)),
                Event::End(TagEnd::Image),
            ],
        }
    }

    /// Replace claimed container lines with their wrapper markup.
    ///
    /// Markup is emitted as standalone HTML blocks, separated by blank lines
    /// so the container body is still parsed as markdown.
    fn rewrite_containers<'a>(&self, body: &'a str) -> Cow<'a, str> {
        if !body.contains(":::") {
            return Cow::Borrowed(body);
        }

        let mut fences = FenceTracker::new();
        let mut open: Vec<(usize, String)> = Vec::new();
        let mut output = String::with_capacity(body.len());

        for line in body.split_inclusive('\n') {
            if fences.observe(line.trim_end_matches(&['\n', '\r'][..])) {
                output.push_str(line);
                continue;
            }

            let content = line.trim_end_matches(&['\n', '\r'][..]);

            if let Some(marker_len) = closing_marker_len(content) {
                if open.last().is_some_and(|(len, _)| marker_len >= *len) {
                    if let Some((_, name)) = open.pop() {
                        let markup = self
                            .extensions
                            .dispatch(&Token::ContainerClose { name: &name })
                            .unwrap_or_default();
                        push_block(&mut output, &markup);
                    }
                    continue;
                }
            } else if let Some(opening) = parse_opening(content) {
                let markup = self.extensions.dispatch(&Token::ContainerOpen {
                    name: opening.name,
                    params: opening.params,
                });

                if let Some(markup) = markup {
                    push_block(&mut output, &markup);
                    open.push((opening.marker_len, opening.name.to_string()));
                    continue;
                }
            }

            output.push_str(line);
        }

        // Unclosed containers end with the document.
        while let Some((_, name)) = open.pop() {
            let markup = self
                .extensions
                .dispatch(&Token::ContainerClose { name: &name })
                .unwrap_or_default();
            push_block(&mut output, &markup);
        }

        Cow::Owned(output)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(&RenderConfig::default()).expect("default config is valid")
    }
}

/// Render a document with the default configuration.
///
/// The default renderer is built on first use and shared by every later
/// call.
pub fn render_document(source: &str) -> Result<RenderedDocument, ParseError> {
    default_renderer().render(source)
}

fn default_renderer() -> &'static Renderer {
    static DEFAULT: OnceLock<Renderer> = OnceLock::new();
    DEFAULT.get_or_init(Renderer::default)
}

struct PendingHeading<'a> {
    level: u8,
    classes: Vec<CowStr<'a>>,
    attrs: Vec<(CowStr<'a>, Option<CowStr<'a>>)>,
    range: Range<usize>,
    inner: Vec<Event<'a>>,
}

struct PendingCode {
    info: String,
    text: String,
}

struct PendingImage<'a> {
    start: Tag<'a>,
    alt: String,
    depth: usize,
}

/// Route events into the open heading, if any.
fn push<'a>(
    events: &mut Vec<Event<'a>>,
    heading: &mut Option<PendingHeading<'a>>,
    new: impl IntoIterator<Item = Event<'a>>,
) {
    match heading {
        Some(pending) => pending.inner.extend(new),
        None => events.extend(new),
    }
}

fn push_block(output: &mut String, markup: &str) {
    if !output.is_empty() {
        if !output.ends_with('\n') {
            output.push('\n');
        }
        if !output.ends_with("\n\n") {
            output.push('\n');
        }
    }
    output.push_str(markup);
    output.push_str("\n\n");
}

/// `<a ...>` written as inline HTML.
fn is_anchor_open(markup: &str) -> bool {
    let mut chars = markup.chars();
    chars.next() == Some('<')
        && matches!(chars.next(), Some('a' | 'A'))
        && matches!(chars.next(), Some('>') | Some(' ' | '\t' | '\n' | '\r'))
}

fn is_anchor_close(markup: &str) -> bool {
    let lower = markup.to_ascii_lowercase();
    lower
        .strip_prefix("</a")
        .is_some_and(|rest| rest.trim_start() == ">")
}

/// Anchor id for a rendered heading.
///
/// ATX headings are parsed from their source line with the same function
/// the table of contents uses; other headings slug their rendered text.
fn heading_id(source: &str, heading: &PendingHeading<'_>) -> String {
    let line = source
        .get(heading.range.clone())
        .unwrap_or_default()
        .trim_end_matches(&['\n', '\r'][..]);

    if !line.contains('\n') {
        if let Some(parsed) = parse_heading_line(line) {
            return parsed.id;
        }
    }

    let mut text = String::new();
    for event in &heading.inner {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            _ => {}
        }
    }
    slugify(&text)
}
