//! Custom container blocks.
//!
//! A container opens with a line of three or more colons, a directive name
//! and its parameters, and closes with a line of at least as many colons:
//!
//! ```text
//! ::: button https://example.com/demo
//! Book a demo
//! :::
//! ```

use std::fmt;
use std::sync::{Arc, OnceLock};

use html_escape::encode_double_quoted_attribute as attr;
use regex::Regex;

fn opening_pattern() -> &'static Regex {
    static OPENING: OnceLock<Regex> = OnceLock::new();
    OPENING.get_or_init(|| {
        Regex::new(r"^ {0,3}(:{3,})[ \t]*([A-Za-z][\w-]*)(?:[ \t]+(.*?))?[ \t]*$")
            .expect("static container pattern is valid")
    })
}

fn closing_pattern() -> &'static Regex {
    static CLOSING: OnceLock<Regex> = OnceLock::new();
    CLOSING.get_or_init(|| {
        Regex::new(r"^ {0,3}(:{3,})[ \t]*$").expect("static container pattern is valid")
    })
}

/// The opening line of a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opening<'a> {
    /// Number of colons in the marker
    pub marker_len: usize,
    pub name: &'a str,
    /// Everything after the name, trimmed (may be empty)
    pub params: &'a str,
}

/// Parse a line as a container opening.
///
/// Only the shape is checked here; whether a directive claims the block is
/// decided by [`ContainerBlocks::open`].
pub fn parse_opening(line: &str) -> Option<Opening<'_>> {
    let caps = opening_pattern().captures(line)?;

    Some(Opening {
        marker_len: caps.get(1)?.as_str().len(),
        name: caps.get(2)?.as_str(),
        params: caps.get(3).map(|m| m.as_str()).unwrap_or_default(),
    })
}

/// Length of the colon marker if `line` is a closing line.
pub fn closing_marker_len(line: &str) -> Option<usize> {
    let caps = closing_pattern().captures(line)?;
    Some(caps.get(1)?.as_str().len())
}

/// A named container directive.
pub trait ContainerDirective: fmt::Debug + Send + Sync {
    /// Directive name as written after the colons.
    fn name(&self) -> &str;

    /// Whether the parameter tokens fit the directive's grammar.
    fn validate(&self, params: &[&str]) -> bool;

    /// Opening markup. Only called with parameters that passed
    /// [`validate`](Self::validate).
    fn open(&self, params: &[&str]) -> String;

    /// Closing markup.
    fn close(&self) -> String;
}

/// `::: button <destination> [class...]` renders its content as a link
/// styled as a button.
#[derive(Debug, Clone, Copy, Default)]
pub struct ButtonDirective;

impl ContainerDirective for ButtonDirective {
    fn name(&self) -> &str {
        "button"
    }

    fn validate(&self, params: &[&str]) -> bool {
        !params.is_empty()
    }

    fn open(&self, params: &[&str]) -> String {
        let destination = params.first().copied().unwrap_or_default();

        let mut class = String::from("button");
        for extra in params.iter().skip(1) {
            class.push(' ');
            class.push_str(extra);
        }

        format!(
            r#"<a href="{}" class="{}" target="_blank" rel="noopener noreferrer">"#,
            attr(destination),
            attr(&class)
        )
    }

    fn close(&self) -> String {
        "</a>".to_string()
    }
}

/// The set of recognised container directives.
#[derive(Debug, Clone)]
pub struct ContainerBlocks {
    directives: Vec<Arc<dyn ContainerDirective>>,
}

impl Default for ContainerBlocks {
    fn default() -> Self {
        Self::new().with(ButtonDirective)
    }
}

impl ContainerBlocks {
    /// An empty set; no container is claimed.
    pub fn new() -> Self {
        Self {
            directives: Vec::new(),
        }
    }

    /// Add a directive. A later directive with the same name wins.
    pub fn with(mut self, directive: impl ContainerDirective + 'static) -> Self {
        self.directives.insert(0, Arc::new(directive));
        self
    }

    fn find(&self, name: &str) -> Option<&dyn ContainerDirective> {
        self.directives
            .iter()
            .find(|d| d.name().eq_ignore_ascii_case(name))
            .map(|d| d.as_ref())
    }

    /// Opening markup, or `None` when no directive claims the block.
    ///
    /// A directive needs its name followed by at least one parameter token.
    pub fn open(&self, name: &str, params: &str) -> Option<String> {
        let tokens: Vec<&str> = params.split_whitespace().collect();
        if tokens.is_empty() {
            tracing::trace!("Container '{}' has no parameters, not claimed", name);
            return None;
        }

        let Some(directive) = self.find(name) else {
            tracing::trace!("No container directive named '{}'", name);
            return None;
        };

        if !directive.validate(&tokens) {
            tracing::trace!("Container '{}' rejected parameters '{}'", name, params);
            return None;
        }

        Some(directive.open(&tokens))
    }

    /// Closing markup for a block opened by `name`.
    pub fn close(&self, name: &str) -> Option<String> {
        self.find(name).map(|d| d.close())
    }
}
