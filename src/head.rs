//! Page metadata and its `<head>` rendering.
//!
//! Templates return a [`HeadConfig`]; the page assembler turns it into the
//! inner contents of `<head>` with [`render_head`]. Only the recognized
//! fields exist; extra `<meta>`/`<link>` entries go through [`HeadTag`].

use maud::{Markup, html};
use serde::Serialize;
use std::collections::BTreeMap;

pub const DEFAULT_CHARSET: &str = "UTF-8";
pub const DEFAULT_VIEWPORT: &str = "width=device-width, initial-scale=1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadConfig {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewport: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<HeadTag>,
}

impl HeadConfig {
    /// Title plus the stock charset and viewport.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            charset: Some(DEFAULT_CHARSET.to_string()),
            viewport: Some(DEFAULT_VIEWPORT.to_string()),
            tags: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadTagKind {
    Meta,
    Link,
}

/// An extra void element in `<head>`. Attributes render in key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadTag {
    #[serde(rename = "type")]
    pub kind: HeadTagKind,
    pub attributes: BTreeMap<String, String>,
}

impl HeadTag {
    pub fn link(rel: &str, href: &str) -> Self {
        Self {
            kind: HeadTagKind::Link,
            attributes: BTreeMap::from([
                ("href".to_string(), href.to_string()),
                ("rel".to_string(), rel.to_string()),
            ]),
        }
    }

    pub fn meta(name: &str, content: &str) -> Self {
        Self {
            kind: HeadTagKind::Meta,
            attributes: BTreeMap::from([
                ("content".to_string(), content.to_string()),
                ("name".to_string(), name.to_string()),
            ]),
        }
    }
}

/// Inner contents of `<head>`, charset first so browsers see it early.
pub fn render_head(head: &HeadConfig) -> Markup {
    html! {
        @if let Some(charset) = &head.charset {
            meta charset=(charset);
        }
        @if let Some(viewport) = &head.viewport {
            meta name="viewport" content=(viewport);
        }
        title { (head.title) }
        @for tag in &head.tags {
            (render_tag(tag))
        }
    }
}

fn render_tag(tag: &HeadTag) -> Markup {
    let name = match tag.kind {
        HeadTagKind::Meta => "meta",
        HeadTagKind::Link => "link",
    };
    // maud has no dynamic attribute names; attribute values are still escaped.
    let mut out = format!("<{name}");
    for (key, value) in &tag.attributes {
        if key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == ':') {
            let escaped = html! { (value) };
            out.push_str(&format!(" {}=\"{}\"", key, escaped.into_string()));
        }
    }
    out.push('>');
    maud::PreEscaped(out)
}
