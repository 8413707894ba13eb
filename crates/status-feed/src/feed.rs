//! RSS 2.0 and Atom parsing.
//!
//! Status pages publish a small, regular document, so items are extracted
//! with string scanning rather than a full XML parser.

use serde::{Deserialize, Serialize};

use crate::error::FeedError;

/// One status feed item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Incident {
    /// Stable identifier of the item within its feed.
    pub id: String,
    /// Plain text title.
    pub title: String,
    /// HTML summary.
    pub summary: String,
}

impl Incident {
    /// Create an incident.
    pub fn new(id: impl Into<String>, title: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            summary: summary.into(),
        }
    }
}

/// Parse an RSS 2.0 or Atom document into incidents, in document order.
///
/// Items without a title are skipped.
pub fn parse_feed(content: &str) -> Result<Vec<Incident>, FeedError> {
    if content.contains("<rss") || content.contains("<channel") {
        Ok(parse_blocks(content, "item", &["guid", "link", "title"], &["description"]))
    } else if content.contains("<feed") {
        Ok(parse_blocks(content, "entry", &["id", "title"], &["summary", "content"]))
    } else {
        Err(FeedError::Malformed(
            "document is neither RSS nor Atom".to_string(),
        ))
    }
}

/// Extract every `<block>` element, taking the id and summary from the first
/// tag present in each fallback list.
fn parse_blocks(content: &str, block: &str, id_tags: &[&str], summary_tags: &[&str]) -> Vec<Incident> {
    let close = format!("</{}>", block);

    element_starts(content, block)
        .filter_map(|body| {
            let body = &body[..body.find(&close)?];
            let title = extract_tag(body, "title")?;
            let id = first_tag(body, id_tags).unwrap_or_else(|| title.clone());
            let summary = first_tag(body, summary_tags).unwrap_or_default();
            Some(Incident { id, title, summary })
        })
        .collect()
}

fn first_tag(content: &str, tags: &[&str]) -> Option<String> {
    tags.iter()
        .filter_map(|tag| extract_tag(content, tag))
        .find(|value| !value.is_empty())
}

/// Iterate over the bodies (text after the opening tag) of `<tag>` elements.
fn element_starts<'a>(content: &'a str, tag: &str) -> impl Iterator<Item = &'a str> + 'a {
    let open = format!("<{}", tag);
    let mut rest = content;

    std::iter::from_fn(move || loop {
        let start = rest.find(&open)?;
        let after = &rest[start + open.len()..];

        // Reject longer tag names sharing the prefix, e.g. <items> for <item>
        match after.chars().next() {
            Some(c) if c == '>' || c.is_whitespace() => {}
            _ => {
                rest = after;
                continue;
            }
        }

        let body_start = after.find('>')? + 1;
        rest = &after[body_start..];
        return Some(rest);
    })
}

/// Extract the decoded text content of the first `<tag>` element.
fn extract_tag(content: &str, tag: &str) -> Option<String> {
    let body = element_starts(content, tag).next()?;
    let end_tag = format!("</{}>", tag);
    let end = body.find(&end_tag)?;
    Some(decode_text(body[..end].trim()))
}

/// Unwrap CDATA sections and decode XML entities.
fn decode_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(start) = rest.find("<![CDATA[") {
        out.push_str(&decode_entities(&rest[..start]));
        let after = &rest[start + "<![CDATA[".len()..];
        match after.find("]]>") {
            Some(end) => {
                out.push_str(&after[..end]);
                rest = &after[end + "]]>".len()..];
            }
            None => {
                out.push_str(after);
                rest = "";
            }
        }
    }
    out.push_str(&decode_entities(rest));

    out.trim().to_string()
}

fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp..];

        let decoded = after.find(';').and_then(|semi| {
            let entity = &after[1..semi];
            let ch = match entity {
                "lt" => Some('<'),
                "gt" => Some('>'),
                "amp" => Some('&'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                    .and_then(char::from_u32),
            };
            ch.map(|ch| (ch, semi))
        });

        match decoded {
            Some((ch, semi)) => {
                out.push(ch);
                rest = &after[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &after[1..];
            }
        }
    }
    out.push_str(rest);

    out
}
