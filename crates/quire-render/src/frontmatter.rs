//! Frontmatter extraction and parsing.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_yaml::Value;

const DELIMITER: &str = "---";

/// Parsed frontmatter of a document.
///
/// Keys are caller-defined and no schema is enforced: every scalar value is
/// kept in its string form, so a missing or oddly typed key never fails a
/// render.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FrontMatter {
    fields: BTreeMap<String, String>,
}

impl FrontMatter {
    /// Look up a field by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Page title.
    pub fn title(&self) -> Option<&str> {
        self.get("title")
    }

    /// Short summary used on listing cards.
    pub fn description(&self) -> Option<&str> {
        self.get("description")
    }

    /// Publication date, as written in the header.
    pub fn date(&self) -> Option<&str> {
        self.get("date")
    }

    /// Media reference for the lead image.
    pub fn thumbnail(&self) -> Option<&str> {
        self.get("thumbnail")
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over fields in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn from_yaml(yaml: &str) -> Result<Self, FrontmatterError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let value: Value = serde_yaml::from_str(yaml)
            .map_err(|e| FrontmatterError::InvalidYaml(e.to_string()))?;

        match value {
            Value::Null => Ok(Self::default()),
            Value::Mapping(mapping) => {
                let mut fields = BTreeMap::new();
                for (key, value) in mapping {
                    // Sequence or mapping keys have no sensible string form.
                    if let Some(key) = scalar_to_string(&key) {
                        fields.insert(key, value_to_string(&value));
                    }
                }
                Ok(Self { fields })
            }
            _ => Err(FrontmatterError::InvalidYaml(
                "frontmatter must be a mapping of keys to values".to_string(),
            )),
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FrontMatter {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

fn value_to_string(value: &Value) -> String {
    scalar_to_string(value).unwrap_or_else(|| {
        serde_yaml::to_string(value)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default()
    })
}

/// Split a document into its frontmatter and body.
///
/// The header block opens with a `---` line at the very start of the document
/// and closes at the next `---` line. Everything after the closing line is
/// returned untouched as the body. Without a header block the whole source is
/// the body.
pub fn extract_frontmatter(source: &str) -> Result<(FrontMatter, &str), FrontmatterError> {
    let text = source.strip_prefix('\u{feff}').unwrap_or(source);

    let (first, mut rest) = split_line(text);
    if first.trim_end() != DELIMITER {
        return Ok((FrontMatter::default(), source));
    }

    let header_start = text.len() - rest.len();

    while !rest.is_empty() {
        let line_start = text.len() - rest.len();
        let (line, after) = split_line(rest);

        if line.trim_end() == DELIMITER {
            let front_matter = FrontMatter::from_yaml(&text[header_start..line_start])?;
            return Ok((front_matter, after));
        }

        rest = after;
    }

    Err(FrontmatterError::Unclosed)
}

/// Split off the first line, dropping its `\n`.
fn split_line(text: &str) -> (&str, &str) {
    match text.find('\n') {
        Some(pos) => (&text[..pos], &text[pos + 1..]),
        None => (text, ""),
    }
}

/// Errors that can occur when parsing frontmatter.
#[derive(Debug, thiserror::Error)]
pub enum FrontmatterError {
    #[error("Unclosed frontmatter block - missing closing ---")]
    Unclosed,

    #[error("Invalid YAML in frontmatter: {0}")]
    InvalidYaml(String),
}
