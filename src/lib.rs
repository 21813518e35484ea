//! # kg-pages
//!
//! Stream-driven static page templates for Knowledge Graph entity documents.
//! A template declares which entities it wants (a *stream*) and a handful of
//! pure functions that turn one entity document into one static page.
//!
//! # Resolution Contract
//!
//! For every (document, locale) pair a template's stream yields:
//!
//! ```text
//! path         document            →  "/help/123"
//! redirects    document            →  ["/old-path", ...]
//! head         document + context  →  title, charset, viewport
//! auth scope   document            →  (claims.email in ["a@x.com"])   (gated templates only)
//! render       document + context  →  <body> markup
//! ```
//!
//! The functions are independent and pure, so the resolver runs them in
//! parallel and a rebuild with the same input is byte-identical. Path and
//! redirect conflicts are checked once every page is resolved.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`document`] | Stream documents and the enumerated field set |
//! | [`stream`] | Stream declarations, filtering, projection, locale expansion |
//! | [`template`] | The [`template::Template`] contract |
//! | [`templates`] | The shipped templates: help articles and the gated admin page |
//! | [`resolve`] | Document → [`resolve::ResolvedPage`], conflict detection |
//! | [`head`] | [`head::HeadConfig`] and `<head>` rendering |
//! | [`auth`] | Claim-expression scopes and view-time identity providers |
//! | [`richtext`] | Lexical rich-text trees and their serializer |
//! | [`site`] | Full HTML pages, redirect stubs, `pages.json` |
//! | [`load`] | Reading stream documents from a directory of JSON files |
//! | [`config`] | `config.toml` loading, merging and validation |
//! | [`error`] | Configuration and conflict errors |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Fields Are Enumerated, Not Looked Up
//!
//! Documents are typed structs and [`document::Field`] names every field a
//! template may read. A template declares the fields it references, and the
//! resolver refuses to run it against a stream that does not list them.
//! Documents are projected down to the listed fields before any template
//! sees them, so a forgotten field shows up as a configuration error on the
//! first build rather than as a silently empty page.
//!
//! ## Gating Is a Capability
//!
//! [`template::Template::auth_scope`] returns an optional resolver. A template
//! without one is public. A template with one always produces a scope, and
//! an empty identity list produces `(claims.email in [])`, which admits
//! nobody.
//!
//! ## Rich Text Goes Through the Serializer
//!
//! Templates never index into rich-text trees. Markup and media lookups are
//! methods of [`richtext::RichTextSerializer`]; untyped positional lookups exist only
//! in [`richtext::compat`].

pub mod auth;
pub mod config;
pub mod document;
pub mod error;
pub mod head;
pub mod load;
pub mod output;
pub mod resolve;
pub mod richtext;
pub mod site;
pub mod stream;
pub mod template;
pub mod templates;

#[cfg(test)]
pub(crate) mod test_helpers;
