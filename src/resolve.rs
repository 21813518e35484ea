//! Stream-to-page resolution.
//!
//! Turns a template and a document set into [`ResolvedPage`]s: one per
//! (document, locale) pair the template's stream yields. Resolution is the
//! only place that knows about locales and output layout; templates see a
//! finished [`RenderContext`] and nothing else.
//!
//! ## Steps
//!
//! 1. Validate the stream declaration and check that it lists every field
//!    the template references.
//! 2. Select and project documents ([`StreamConfig::select`]).
//! 3. For a singular template (constant path), require exactly one item per
//!    locale.
//! 4. Resolve every item in parallel. Each call is pure; the first
//!    configuration error wins.
//! 5. Check the shared path namespace with [`detect_conflicts`].
//!
//! ## Locale namespacing
//!
//! Pages in a stream's first locale live at the template's path. Every other
//! locale is prefixed: `/help/123` in `fr` becomes `/fr/help/123`. Redirects
//! are prefixed the same way.
//!
//! [`StreamConfig::select`]: crate::stream::StreamConfig::select

use crate::config::OutputLayout;
use crate::document::Document;
use crate::error::{ConfigurationError, ConflictError};
use crate::head::HeadConfig;
use crate::stream::StreamItem;
use crate::template::{RenderContext, Template};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("Conflict: {0}")]
    Conflict(#[from] ConflictError),
    #[error("document '{document}' [{locale}] is not in stream '{stream}'")]
    NotInStream {
        stream: String,
        document: String,
        locale: String,
    },
}

/// Everything the page assembler needs to write one page and its stubs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedPage {
    pub template: String,
    pub stream: String,
    pub document_id: String,
    pub locale: String,
    #[serde(skip)]
    pub default_locale: bool,
    /// Output path, locale prefix included.
    pub path: String,
    pub redirects: Vec<String>,
    pub head: HeadConfig,
    /// Present only for gated templates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_scope: Option<String>,
    #[serde(skip)]
    pub body: String,
}

/// Prefix `path` for non-default locales.
pub fn localized_path(path: &str, locale: &str, default_locale: &str) -> String {
    if locale == default_locale {
        path.to_string()
    } else {
        format!("/{locale}{path}")
    }
}

/// Whether `path` is a normalized absolute page path.
///
/// `/` alone is the site root. Anything else is `/` followed by non-empty
/// segments separated by single slashes, none of them `.` or `..`, with no
/// trailing slash. Whitespace, backslashes, `?` and `#` are rejected
/// anywhere. Two accepted paths map to the same output file only if they
/// are equal, so conflict detection can compare them as strings.
pub fn is_normalized_path(path: &str) -> bool {
    if path == "/" {
        return true;
    }
    let Some(rest) = path.strip_prefix('/') else {
        return false;
    };
    if rest
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '?' | '#' | '\\'))
    {
        return false;
    }
    rest.split('/')
        .all(|segment| !matches!(segment, "" | "." | ".."))
}

fn check_path(document: &Document, path: &str) -> Result<(), ConfigurationError> {
    if !is_normalized_path(path) {
        return Err(ConfigurationError::InvalidPath {
            document: document.label().to_string(),
            path: path.to_string(),
        });
    }
    Ok(())
}

/// Resolve a single (document, locale) pair.
pub fn resolve_item(
    template: &dyn Template,
    item: &StreamItem,
    layout: OutputLayout,
) -> Result<ResolvedPage, ConfigurationError> {
    let document = &item.document;
    let stream = template.stream();
    let default_locale = stream.default_locale().unwrap_or(item.locale.as_str());

    let canonical = template.path(document)?;
    check_path(document, &canonical)?;
    let path = localized_path(&canonical, &item.locale, default_locale);

    let redirects = template
        .redirects(document)?
        .into_iter()
        .map(|r| {
            check_path(document, &r)?;
            Ok(localized_path(&r, &item.locale, default_locale))
        })
        .collect::<Result<Vec<_>, ConfigurationError>>()?;

    let ctx = RenderContext {
        relative_prefix_to_root: layout.relative_prefix_to_root(&path),
        path: path.clone(),
        locale: item.locale.clone(),
    };

    let head = template.head_config(document, &ctx)?;
    let auth_scope = template
        .auth_scope()
        .map(|resolver| resolver.resolve(document))
        .transpose()?;
    let body = template.render(document, &ctx)?.into_string();

    Ok(ResolvedPage {
        template: template.name().to_string(),
        stream: stream.id.clone(),
        document_id: document.label().to_string(),
        locale: item.locale.clone(),
        default_locale: item.locale == default_locale,
        path,
        redirects,
        head,
        auth_scope,
        body,
    })
}

/// Resolve the page of one document, checking the stream the same way
/// [`resolve_template`] does. `locale` defaults to the stream's first.
pub fn resolve_document(
    template: &dyn Template,
    documents: &[Document],
    id: &str,
    locale: Option<&str>,
    layout: OutputLayout,
) -> Result<ResolvedPage, ResolveError> {
    let stream = template.stream();
    stream.validate()?;
    stream.check_fields(template.referenced_fields())?;

    let locale = locale.or(stream.default_locale()).unwrap_or_default();
    let item = stream
        .select(documents)
        .into_iter()
        .find(|i| i.document.id.as_deref() == Some(id) && i.locale == locale)
        .ok_or_else(|| ResolveError::NotInStream {
            stream: stream.id.clone(),
            document: id.to_string(),
            locale: locale.to_string(),
        })?;
    Ok(resolve_item(template, &item, layout)?)
}

/// Resolve every page a template produces from `documents`.
///
/// Conflicts are checked within this template only; use
/// [`detect_conflicts`] across templates when several share one site.
pub fn resolve_template(
    template: &dyn Template,
    documents: &[Document],
    layout: OutputLayout,
) -> Result<Vec<ResolvedPage>, ResolveError> {
    let stream = template.stream();
    stream.validate()?;
    stream.check_fields(template.referenced_fields())?;

    let items = stream.select(documents);
    tracing::debug!(
        template = template.name(),
        stream = %stream.id,
        items = items.len(),
        "selected stream items"
    );

    if template.is_singular() {
        for locale in &stream.localization.locales {
            let documents: Vec<String> = items
                .iter()
                .filter(|i| &i.locale == locale)
                .map(|i| i.document.label().to_string())
                .collect();
            if documents.len() != 1 {
                return Err(ConfigurationError::SingularStream {
                    stream: stream.id.clone(),
                    locale: locale.clone(),
                    documents,
                }
                .into());
            }
        }
    }

    let pages = items
        .par_iter()
        .map(|item| resolve_item(template, item, layout))
        .collect::<Result<Vec<_>, _>>()?;

    detect_conflicts(&pages)?;
    Ok(pages)
}

/// Check the shared path namespace of a set of resolved pages.
///
/// Fails on the first of, in page order:
/// - two pages with the same path,
/// - a redirect equal to its own page's path,
/// - a redirect equal to another page's path,
/// - two pages claiming the same redirect.
pub fn detect_conflicts(pages: &[ResolvedPage]) -> Result<(), ConflictError> {
    let mut owners: BTreeMap<&str, &str> = BTreeMap::new();
    for page in pages {
        if let Some(first) = owners.insert(&page.path, &page.document_id) {
            return Err(ConflictError::DuplicatePath {
                path: page.path.clone(),
                first: first.to_string(),
                second: page.document_id.clone(),
            });
        }
    }

    let mut claimed: BTreeMap<&str, &str> = BTreeMap::new();
    for page in pages {
        for redirect in &page.redirects {
            if *redirect == page.path {
                return Err(ConflictError::SelfRedirect {
                    path: redirect.clone(),
                    document: page.document_id.clone(),
                });
            }
            if let Some(owner) = owners.get(redirect.as_str()) {
                return Err(ConflictError::RedirectShadowsPage {
                    path: redirect.clone(),
                    document: page.document_id.clone(),
                    page: owner.to_string(),
                });
            }
            if let Some(first) = claimed.insert(redirect, &page.document_id) {
                return Err(ConflictError::DuplicateRedirect {
                    path: redirect.clone(),
                    first: first.to_string(),
                    second: page.document_id.clone(),
                });
            }
        }
    }
    Ok(())
}
