//! The template contract.
//!
//! A template is a stream declaration plus a handful of pure functions over
//! one stream document. The page resolver (see [`crate::resolve`]) calls
//! them independently for every (document, locale) pair; none of them may
//! depend on another's output or on shared state.
//!
//! | Method | Produces |
//! |--------|----------|
//! | [`Template::path`] | canonical output path |
//! | [`Template::redirects`] | alias paths forwarding to the canonical path |
//! | [`Template::head_config`] | `<head>` metadata |
//! | [`Template::auth_scope`] | optional visibility gate |
//! | [`Template::render`] | body markup |

use crate::auth::AuthScopeResolver;
use crate::document::{Document, Field};
use crate::error::ConfigurationError;
use crate::head::HeadConfig;
use crate::stream::StreamConfig;
use maud::Markup;

/// What a resolver knows about the page being produced besides the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderContext {
    /// Final output path, locale prefix included.
    pub path: String,
    /// Relative prefix from the page back to the site root, e.g. `"../../"`.
    pub relative_prefix_to_root: String,
    pub locale: String,
}

pub trait Template: Send + Sync {
    /// Stable identifier used by the CLI and in `pages.json`.
    fn name(&self) -> &'static str;

    fn stream(&self) -> &StreamConfig;

    /// Every document field any resolver of this template reads.
    fn referenced_fields(&self) -> &'static [Field];

    /// Whether [`Template::path`] ignores the document. Such a template
    /// needs its stream to yield exactly one document per locale.
    fn is_singular(&self) -> bool {
        false
    }

    fn path(&self, document: &Document) -> Result<String, ConfigurationError>;

    fn redirects(&self, _document: &Document) -> Result<Vec<String>, ConfigurationError> {
        Ok(Vec::new())
    }

    fn head_config(
        &self,
        document: &Document,
        ctx: &RenderContext,
    ) -> Result<HeadConfig, ConfigurationError>;

    /// `None` means the stream is not gated. An empty identity list is a
    /// gate that admits nobody, which is different.
    fn auth_scope(&self) -> Option<&dyn AuthScopeResolver> {
        None
    }

    fn render(&self, document: &Document, ctx: &RenderContext) -> Result<Markup, ConfigurationError>;
}
