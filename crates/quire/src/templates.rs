//! Standalone page template.

use minijinja::{context, Environment};
use quire_render::{render_thumbnail, RenderedDocument};

/// A table of contents entry as laid out on the page.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TocEntry {
    /// Heading text
    pub title: String,
    /// Anchor ID
    pub id: String,
    /// Indentation in rem, one per level below h1
    pub indent: u8,
}

/// Page renderer using minijinja.
pub struct PageTemplate {
    env: Environment<'static>,
}

impl PageTemplate {
    pub fn new() -> Self {
        let mut env = Environment::new();

        env.add_template_owned("page.html".to_string(), PAGE_TEMPLATE.to_string())
            .expect("Failed to add page template");

        Self { env }
    }

    /// Wrap a rendered document in a full HTML page.
    pub fn render(&self, doc: &RenderedDocument) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template("page.html")?;

        let toc: Vec<TocEntry> = doc
            .toc
            .iter()
            .map(|heading| TocEntry {
                title: heading.text.clone(),
                id: heading.id.clone(),
                indent: heading.level.saturating_sub(1),
            })
            .collect();

        let fm = &doc.front_matter;

        tmpl.render(context! {
            title => fm.title().unwrap_or_default(),
            description => fm.description().unwrap_or_default(),
            date => fm.date().unwrap_or_default(),
            thumbnail => fm.thumbnail().map(|_| render_thumbnail(fm)),
            content => &doc.html,
            toc => toc,
        })
    }
}

impl Default for PageTemplate {
    fn default() -> Self {
        Self::new()
    }
}

const PAGE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{ title }}</title>
  {% if description %}<meta name="description" content="{{ description }}">
  {% endif %}<link rel="stylesheet" href="highlight.css">
</head>
<body>
  <div class="post">
    <article class="post-body">
      {% if title %}<h1 class="post-title">{{ title }}</h1>
      {% endif %}{% if date %}<time class="post-date">{{ date }}</time>
      {% endif %}{% if thumbnail %}{{ thumbnail | safe }}
      {% endif %}{{ content | safe }}
    </article>
    {% if toc %}
    <nav class="toc">
      <h2>Table of Contents</h2>
      <ul>
      {% for entry in toc %}
        <li style="margin-left: {{ entry.indent }}rem"><a href="#{{ entry.id }}">{{ entry.title }}</a></li>
      {% endfor %}
      </ul>
    </nav>
    {% endif %}
  </div>
</body>
</html>"##;
