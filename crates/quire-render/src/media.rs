//! Media references: inline video embeds and zoomable images.

use std::fmt;
use std::sync::Arc;

use html_escape::encode_double_quoted_attribute as attr;

use crate::frontmatter::FrontMatter;

/// An image reference taken from a markdown image token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaReference {
    pub src: String,
    pub alt: String,
}

impl MediaReference {
    pub fn new(src: impl Into<String>, alt: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            alt: alt.into(),
        }
    }
}

/// How a media reference is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// Embedded video player
    Video,
    /// Image that opens a full-size overlay when activated
    Image,
}

impl MediaKind {
    /// Classify a reference by the extension of its path.
    ///
    /// Query strings and fragments are ignored, so `clip.mp4?t=3` is a video.
    pub fn classify(src: &str) -> Self {
        let path = src.split(&['?', '#'][..]).next().unwrap_or(src);
        if path.to_ascii_lowercase().ends_with(".mp4") {
            Self::Video
        } else {
            Self::Image
        }
    }
}

/// Signal emitted by a zoomable image.
///
/// The overlay itself lives outside the renderer; a hook only decides which
/// attributes on the clickable container carry `(src, alt)` to it.
pub trait InteractionHook: fmt::Debug + Send + Sync {
    /// Attributes for the clickable container, each with a leading space.
    fn attributes(&self, media: &MediaReference) -> String;
}

/// Exposes `(src, alt)` as `data-zoom-src` / `data-zoom-alt` for a
/// delegated click listener.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataAttributeHook;

impl InteractionHook for DataAttributeHook {
    fn attributes(&self, media: &MediaReference) -> String {
        format!(
            r#" data-zoom-src="{}" data-zoom-alt="{}""#,
            attr(&media.src),
            attr(&media.alt)
        )
    }
}

/// Calls a named page function with `(src, alt)` on click.
#[derive(Debug, Clone)]
pub struct CallbackHook {
    function: String,
}

impl CallbackHook {
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
        }
    }
}

impl InteractionHook for CallbackHook {
    fn attributes(&self, media: &MediaReference) -> String {
        // Arguments are read back from the data attributes so no value is
        // ever spliced into script text.
        format!(
            r#"{} onclick="{}(this.dataset.zoomSrc, this.dataset.zoomAlt)""#,
            DataAttributeHook.attributes(media),
            attr(&self.function)
        )
    }
}

/// Renders media references as video players or zoomable images.
#[derive(Debug, Clone)]
pub struct MediaResolver {
    hook: Arc<dyn InteractionHook>,
}

impl Default for MediaResolver {
    fn default() -> Self {
        Self::new(Arc::new(DataAttributeHook))
    }
}

impl MediaResolver {
    pub fn new(hook: Arc<dyn InteractionHook>) -> Self {
        Self { hook }
    }

    /// Render the markup for a media reference.
    pub fn resolve(&self, media: &MediaReference) -> String {
        match MediaKind::classify(&media.src) {
            MediaKind::Video => video_markup(media),
            MediaKind::Image => format!(
                r#"<span class="zoomable" role="button" tabindex="0"{}><img src="{}" alt="{}" loading="lazy"></span>"#,
                self.hook.attributes(media),
                attr(&media.src),
                attr(&media.alt)
            ),
        }
    }
}

fn video_markup(media: &MediaReference) -> String {
    let label = if media.alt.is_empty() {
        String::new()
    } else {
        format!(r#" aria-label="{}""#, attr(&media.alt))
    };

    format!(
        r#"<video class="media-video" controls preload="metadata"{}><source src="{}" type="video/mp4">Your browser does not support the video tag.</video>"#,
        label,
        attr(&media.src)
    )
}

/// Render the lead image named by the `thumbnail` frontmatter key.
///
/// A missing key still renders an element with an empty `src`; the broken
/// reference shows up at display time, not as an error.
pub fn render_thumbnail(front_matter: &FrontMatter) -> String {
    format!(
        r#"<img class="thumbnail" src="{}" alt="Thumbnail" width="800" height="400">"#,
        attr(front_matter.thumbnail().unwrap_or_default())
    )
}
