//! Bare URL and email linking.

use linkify::{LinkFinder, LinkKind};
use pulldown_cmark::{CowStr, Event, LinkType, Tag, TagEnd};

/// Split a text run into plain text and link events.
///
/// URLs need a scheme (`https://example.com`, not `example.com`); emails
/// become `mailto:` links.
pub(crate) fn autolink<'a>(finder: &LinkFinder, text: &str) -> Vec<Event<'a>> {
    let mut events = Vec::new();

    for span in finder.spans(text) {
        let piece = span.as_str().to_string();
        let link_type = match span.kind() {
            None => {
                events.push(Event::Text(piece.into()));
                continue;
            }
            Some(LinkKind::Email) => LinkType::Email,
            Some(_) => LinkType::Autolink,
        };

        events.push(Event::Start(Tag::Link {
            link_type,
            dest_url: CowStr::from(piece.clone()),
            title: CowStr::Borrowed(""),
            id: CowStr::Borrowed(""),
        }));
        events.push(Event::Text(piece.into()));
        events.push(Event::End(TagEnd::Link));
    }

    events
}
