//! Shared builders for unit tests.
//!
//! Documents, streams, rich-text trees and resolved pages with just enough
//! filled in to exercise one behavior at a time.

use crate::document::{Document, DocumentMeta, EntityType, Field};
use crate::head::HeadConfig;
use crate::resolve::ResolvedPage;
use crate::richtext::{Node, RichTextAst};
use crate::stream::{Localization, StreamConfig, StreamFilter};
use crate::template::RenderContext;

// =========================================================================
// Documents and streams
// =========================================================================

/// Document with `id` and `name` only; matches no stream.
pub fn document(id: &str, name: &str) -> Document {
    Document {
        id: Some(id.to_string()),
        name: Some(name.to_string()),
        ..Document::default()
    }
}

/// Document of entity type `helpArticle`, untagged locale.
pub fn help_article(id: &str, name: &str) -> Document {
    Document {
        meta: DocumentMeta {
            entity_type: Some(EntityType {
                id: "helpArticle".to_string(),
            }),
            locale: None,
        },
        ..document(id, name)
    }
}

/// `test-stream` over `helpArticle` in `en`, listing `fields`.
pub fn stream(fields: &[Field]) -> StreamConfig {
    StreamConfig {
        id: "test-stream".to_string(),
        fields: fields.iter().copied().collect(),
        filter: StreamFilter {
            entity_types: ["helpArticle".to_string()].into(),
            entity_ids: None,
        },
        localization: Localization {
            locales: vec!["en".to_string()],
        },
    }
}

pub fn ctx(path: &str) -> RenderContext {
    RenderContext {
        path: path.to_string(),
        relative_prefix_to_root: "../".to_string(),
        locale: "en".to_string(),
    }
}

// =========================================================================
// Rich text
// =========================================================================

pub fn rich_text(children: Vec<Node>) -> RichTextAst {
    RichTextAst {
        root: Node {
            kind: "root".to_string(),
            children,
            ..Node::default()
        },
    }
}

pub fn paragraph(children: Vec<Node>) -> Node {
    Node {
        kind: "paragraph".to_string(),
        children,
        ..Node::default()
    }
}

pub fn text_node(text: &str, format: u64) -> Node {
    Node {
        kind: "text".to_string(),
        text: Some(text.to_string()),
        format: serde_json::Value::from(format),
        ..Node::default()
    }
}

pub fn image_node(src: &str) -> Node {
    Node {
        kind: "image".to_string(),
        src: Some(src.to_string()),
        ..Node::default()
    }
}

// =========================================================================
// Resolved pages
// =========================================================================

/// Ungated `help-article` page titled `Page {id}`.
pub fn page(id: &str, path: &str) -> ResolvedPage {
    ResolvedPage {
        template: "help-article".to_string(),
        stream: "test-stream".to_string(),
        document_id: id.to_string(),
        locale: "en".to_string(),
        default_locale: true,
        path: path.to_string(),
        redirects: Vec::new(),
        head: HeadConfig::titled(format!("Page {id}")),
        auth_scope: None,
        body: String::new(),
    }
}

pub fn with_redirects(mut page: ResolvedPage, redirects: &[&str]) -> ResolvedPage {
    page.redirects = redirects.iter().map(|r| r.to_string()).collect();
    page
}
