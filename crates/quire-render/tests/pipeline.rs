use std::sync::Arc;
use std::thread;

use pretty_assertions::assert_eq;
use quire_render::{render_document, slugify, Heading, RenderConfig, Renderer};

const POST: &str = r#"---
title: Supervising tool calls
description: Review agent actions before they run
date: 2024-11-02
thumbnail: /images/supervision.png
---

# Supervising tool calls

Agents call tools. Sometimes they should not.

## Getting Started!!

```bash
pip install sentinel
```

```python
def approve(call):
    return call.safe
```

![Review queue](/images/queue.png)

![Walkthrough](/videos/walkthrough.mp4)

## A  B

::: button https://example.com/demo
Book a demo
:::

### FAQ
"#;

fn anchor_ids(html: &str) -> Vec<String> {
    html.split("<h")
        .skip(1)
        .filter_map(|rest| {
            let rest = rest.strip_prefix(|c: char| c.is_ascii_digit())?;
            let rest = rest.strip_prefix(" id=\"")?;
            rest.split('"').next().map(str::to_string)
        })
        .collect()
}

#[test]
fn toc_ids_match_rendered_anchors() {
    let doc = render_document(POST).unwrap();

    let toc_ids: Vec<String> = doc.toc.iter().map(|h| h.id.clone()).collect();

    assert_eq!(
        toc_ids,
        vec!["supervising-tool-calls", "getting-started", "a-b", "faq"]
    );
    assert_eq!(anchor_ids(&doc.html), toc_ids);

    for heading in &doc.toc {
        assert_eq!(heading.id, slugify(&heading.text));
        assert!(doc.html.contains(&format!("id=\"{}\"", heading.id)));
    }
}

#[test]
fn toc_levels_and_text() {
    let doc = render_document(POST).unwrap();

    assert_eq!(
        doc.toc,
        vec![
            Heading {
                id: "supervising-tool-calls".to_string(),
                text: "Supervising tool calls".to_string(),
                level: 1,
            },
            Heading {
                id: "getting-started".to_string(),
                text: "Getting Started!!".to_string(),
                level: 2,
            },
            Heading {
                id: "a-b".to_string(),
                text: "A  B".to_string(),
                level: 2,
            },
            Heading {
                id: "faq".to_string(),
                text: "FAQ".to_string(),
                level: 3,
            },
        ]
    );
}

#[test]
fn frontmatter_is_isolated_from_body() {
    let doc = render_document("---\ntitle: X\n---\n# Body").unwrap();

    assert_eq!(doc.front_matter.title(), Some("X"));
    assert_eq!(
        doc.toc,
        vec![Heading {
            id: "body".to_string(),
            text: "Body".to_string(),
            level: 1,
        }]
    );
    assert!(!doc.html.contains("title"));
}

#[test]
fn rendering_is_idempotent() {
    let renderer = Renderer::default();

    let first = renderer.render(POST).unwrap();
    let second = renderer.render(POST).unwrap();

    assert_eq!(first.html, second.html);
    assert_eq!(first.toc, second.toc);
    assert_eq!(first, render_document(POST).unwrap());
}

#[test]
fn code_blocks_fall_back_or_highlight() {
    let doc = render_document(POST).unwrap();

    assert!(doc
        .html
        .contains(r#"<pre><code class="language-python"><span class="hl-"#));
    assert!(doc
        .html
        .contains(r#"<pre><code class="language-bash"><span class="hl-"#));

    let plain = render_document("```haskell\nmain = putStrLn \"<hi>\"\n```\n").unwrap();
    assert_eq!(
        plain.html,
        "<pre><code class=\"language-haskell\">main = putStrLn \"&lt;hi&gt;\"\n</code></pre>\n"
    );
}

#[test]
fn media_is_classified() {
    let doc = render_document(POST).unwrap();

    assert!(doc
        .html
        .contains(r#"<source src="/videos/walkthrough.mp4" type="video/mp4">"#));
    assert!(doc.html.contains(r#"data-zoom-src="/images/queue.png""#));
    assert!(doc
        .html
        .contains(r#"<img src="/images/queue.png" alt="Review queue""#));
}

#[test]
fn button_container_is_rendered() {
    let doc = render_document(POST).unwrap();

    assert!(doc.html.contains(
        "<a href=\"https://example.com/demo\" class=\"button\" target=\"_blank\" rel=\"noopener noreferrer\">\n<p>Book a demo</p>\n</a>"
    ));
}

#[test]
fn code_comments_are_reported_unless_skipped() {
    let source = "# Install\n\n```bash\n# fetch deps\n```\n";

    let doc = render_document(source).unwrap();
    assert_eq!(doc.toc.len(), 2);
    assert_eq!(doc.toc[1].text, "fetch deps");

    let mut config = RenderConfig::default();
    config.toc.skip_code_blocks = true;
    let doc = Renderer::new(&config).unwrap().render(source).unwrap();
    assert_eq!(doc.toc.len(), 1);
    assert_eq!(anchor_ids(&doc.html), vec!["install"]);
}

#[test]
fn bare_urls_are_linked() {
    let doc = render_document("See https://example.com/docs or mail hi@example.com.").unwrap();

    assert_eq!(
        doc.html,
        "<p>See <a href=\"https://example.com/docs\">https://example.com/docs</a> or mail \
         <a href=\"mailto:hi@example.com\">hi@example.com</a>.</p>\n"
    );
}

#[test]
fn duplicate_headings_share_an_id() {
    let doc = render_document("## Setup\n\ntext\n\n## Setup\n").unwrap();

    assert_eq!(doc.toc[0].id, doc.toc[1].id);
    assert_eq!(anchor_ids(&doc.html), vec!["setup", "setup"]);
}

#[test]
fn concurrent_renders_share_one_renderer() {
    let renderer = Arc::new(Renderer::default());
    let expected = renderer.render(POST).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let renderer = Arc::clone(&renderer);
            thread::spawn(move || renderer.render(POST).unwrap())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

#[test]
fn serializes_to_json() {
    let doc = render_document("---\ntitle: X\n---\n# Body").unwrap();

    let json = serde_json::to_value(&doc).unwrap();

    assert_eq!(json["front_matter"]["title"], "X");
    assert_eq!(json["toc"][0]["id"], "body");
    assert_eq!(json["toc"][0]["level"], 1);
    assert_eq!(json["html"], "<h1 id=\"body\">Body</h1>\n");
}

#[test]
fn unclosed_frontmatter_is_an_error() {
    assert!(render_document("---\ntitle: X\n# Body").is_err());
}
