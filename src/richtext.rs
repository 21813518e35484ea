//! Rich-text fields and their serializer.
//!
//! Knowledge Graph rich-text (v2) fields carry a serialized Lexical editor
//! tree under a `json` key:
//!
//! ```json
//! { "json": { "root": { "type": "root", "children": [
//!     { "type": "paragraph", "children": [
//!         { "type": "text", "text": "Hello", "format": 1 },
//!         { "type": "image", "src": "https://a.mktgcdn.com/p/x.png", "altText": "x" }
//!     ] }
//! ] } } }
//! ```
//!
//! Templates never walk this tree themselves. They hand it to a
//! [`RichTextSerializer`], which owns both the markup conversion and the
//! named accessors (such as "first embedded media URL"). The stock
//! implementation is [`LexicalSerializer`].
//!
//! Positional lookups (`root.children[i].children[j].src`) are quarantined
//! in [`compat`]; they break silently whenever the editor changes its tree
//! shape and exist only for templates that predate the named accessor.

use maud::{Markup, html};
use serde::{Deserialize, Serialize};

/// A rich-text field as materialized on a stream document.
///
/// `json` is absent when the field exists but was never filled in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RichTextField {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<RichTextAst>,
}

impl RichTextField {
    pub fn ast(&self) -> Option<&RichTextAst> {
        self.json.as_ref()
    }
}

/// Root of a serialized Lexical tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RichTextAst {
    pub root: Node,
}

/// One node of the Lexical tree.
///
/// Only the attributes the serializer understands are kept; everything else
/// in the source JSON is ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Bitmask on text nodes, alignment string on element nodes.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub format: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
}

// Lexical text format bits.
const FORMAT_BOLD: u64 = 1;
const FORMAT_ITALIC: u64 = 1 << 1;
const FORMAT_STRIKETHROUGH: u64 = 1 << 2;
const FORMAT_UNDERLINE: u64 = 1 << 3;
const FORMAT_CODE: u64 = 1 << 4;

impl Node {
    /// Text format bitmask; zero for element nodes.
    fn text_format(&self) -> u64 {
        self.format.as_u64().unwrap_or(0)
    }

    fn is_media(&self) -> bool {
        self.kind == "image" && self.src.as_deref().is_some_and(|s| !s.is_empty())
    }
}

/// Rich-text collaborator used by page renderers.
///
/// Implementations must be pure: the same tree always yields the same
/// markup, so pages are reproducible across builds.
pub trait RichTextSerializer: Send + Sync {
    /// Render the whole tree as body markup.
    fn to_markup(&self, ast: &RichTextAst) -> Markup;

    /// Source URL of the `nth` embedded media node, in document order.
    fn media_src<'a>(&self, ast: &'a RichTextAst, nth: usize) -> Option<&'a str>;

    /// Source URL of the media node at `child` inside top-level block
    /// `block`. `None` when either index is out of range or the node there
    /// is not media.
    fn block_media_src<'a>(
        &self,
        ast: &'a RichTextAst,
        block: usize,
        child: usize,
    ) -> Option<&'a str>;
}

/// Serializer for Lexical editor trees.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalSerializer;

impl RichTextSerializer for LexicalSerializer {
    fn to_markup(&self, ast: &RichTextAst) -> Markup {
        html! {
            div.rich-text {
                @for child in &ast.root.children {
                    (render_node(child))
                }
            }
        }
    }

    fn media_src<'a>(&self, ast: &'a RichTextAst, nth: usize) -> Option<&'a str> {
        let mut media = Vec::new();
        collect_media(&ast.root, &mut media);
        media.get(nth).copied()
    }

    fn block_media_src<'a>(
        &self,
        ast: &'a RichTextAst,
        block: usize,
        child: usize,
    ) -> Option<&'a str> {
        let node = ast.root.children.get(block)?.children.get(child)?;
        node.src.as_deref().filter(|_| node.is_media())
    }
}

fn collect_media<'a>(node: &'a Node, out: &mut Vec<&'a str>) {
    if node.is_media()
        && let Some(src) = node.src.as_deref()
    {
        out.push(src);
    }
    for child in &node.children {
        collect_media(child, out);
    }
}

fn render_children(node: &Node) -> Markup {
    html! {
        @for child in &node.children {
            (render_node(child))
        }
    }
}

fn render_node(node: &Node) -> Markup {
    match node.kind.as_str() {
        "paragraph" => html! { p { (render_children(node)) } },
        "heading" => render_heading(node),
        "quote" => html! { blockquote { (render_children(node)) } },
        "list" => {
            if node.list_type.as_deref() == Some("number") || node.tag.as_deref() == Some("ol") {
                html! { ol { (render_children(node)) } }
            } else {
                html! { ul { (render_children(node)) } }
            }
        }
        "listitem" => html! { li { (render_children(node)) } },
        "link" | "autolink" => match node.url.as_deref().filter(|u| is_safe_url(u)) {
            Some(url) => html! { a href=(url) { (render_children(node)) } },
            None => render_children(node),
        },
        "linebreak" => html! { br; },
        "image" => match node.src.as_deref() {
            Some(src) => html! { img src=(src) alt=[node.alt_text.as_deref()]; },
            None => html! {},
        },
        "text" => render_text(node.text.as_deref().unwrap_or_default(), node.text_format()),
        _ => render_children(node),
    }
}

fn render_heading(node: &Node) -> Markup {
    let inner = render_children(node);
    match node.tag.as_deref() {
        Some("h1") => html! { h1 { (inner) } },
        Some("h2") => html! { h2 { (inner) } },
        Some("h4") => html! { h4 { (inner) } },
        Some("h5") => html! { h5 { (inner) } },
        Some("h6") => html! { h6 { (inner) } },
        _ => html! { h3 { (inner) } },
    }
}

/// Wrap text in one element per format bit, innermost first.
fn render_text(text: &str, format: u64) -> Markup {
    let mut markup = html! { (text) };
    if format & FORMAT_CODE != 0 {
        markup = html! { code { (markup) } };
    }
    if format & FORMAT_UNDERLINE != 0 {
        markup = html! { u { (markup) } };
    }
    if format & FORMAT_STRIKETHROUGH != 0 {
        markup = html! { s { (markup) } };
    }
    if format & FORMAT_ITALIC != 0 {
        markup = html! { em { (markup) } };
    }
    if format & FORMAT_BOLD != 0 {
        markup = html! { strong { (markup) } };
    }
    markup
}

fn is_safe_url(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    match lower.split_once(':') {
        Some((scheme, _)) if !scheme.contains('/') => {
            matches!(scheme, "http" | "https" | "mailto" | "tel")
        }
        _ => true,
    }
}

/// Compatibility shim for positional media lookups.
///
/// Reaches into the tree by child index, e.g. `&[0, 1]` is
/// `root.children[0].children[1].src`. Any index out of range, or a node
/// without `src`, yields `None`. Unlike
/// [`RichTextSerializer::block_media_src`] it does not check the node type.
pub mod compat {
    use super::RichTextAst;

    pub fn positional_media_src<'a>(ast: &'a RichTextAst, path: &[usize]) -> Option<&'a str> {
        let mut node = &ast.root;
        for &idx in path {
            node = node.children.get(idx)?;
        }
        node.src.as_deref()
    }
}
