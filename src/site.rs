//! Page assembly and site output.
//!
//! Takes the resolved pages of every template and writes the static site:
//!
//! ```text
//! dist/
//! ├── help/
//! │   └── 123/index.html       # one page per (document, locale)
//! ├── fr/help/123/index.html   # non-default locale
//! ├── secure/index.html        # gated page
//! ├── old-returns/index.html   # redirect stub → /help/123
//! └── pages.json               # page index with auth scope annotations
//! ```
//!
//! Gated pages are ordinary HTML; the authorization policy travels in
//! `pages.json` for the hosting runtime to enforce per request.
//!
//! HTML is generated with maud, so every document value is escaped. The only
//! pre-escaped inputs are the rendered body (already maud output) and the
//! head (likewise).

use crate::config::SiteConfig;
use crate::document::Document;
use crate::error::ConflictError;
use crate::head::render_head;
use crate::resolve::{self, ResolveError, ResolvedPage};
use crate::template::Template;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use serde::Serialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const PAGES_MANIFEST: &str = "pages.json";

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("template '{template}': {source}")]
    Template {
        template: String,
        source: ResolveError,
    },
    #[error("Conflict: {0}")]
    Conflict(#[from] ConflictError),
}

/// A redirect stub as recorded in `pages.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedirectEntry {
    pub from: String,
    pub to: String,
    pub status: u16,
}

/// Contents of `pages.json`.
#[derive(Debug, Clone, Serialize)]
pub struct SiteManifest {
    pub pages: Vec<ResolvedPage>,
    pub redirects: Vec<RedirectEntry>,
}

impl SiteManifest {
    pub fn gated_pages(&self) -> impl Iterator<Item = &ResolvedPage> {
        self.pages.iter().filter(|p| p.auth_scope.is_some())
    }
}

/// Resolve every template against `documents` and check the combined
/// path namespace. Nothing is written.
pub fn resolve_site(
    templates: &[Box<dyn Template>],
    documents: &[Document],
    config: &SiteConfig,
) -> Result<SiteManifest, BuildError> {
    let mut pages = Vec::new();
    for template in templates {
        let resolved = resolve::resolve_template(template.as_ref(), documents, config.site.output_layout)
            .map_err(|source| BuildError::Template {
                template: template.name().to_string(),
                source,
            })?;
        tracing::info!(template = template.name(), pages = resolved.len(), "resolved template");
        pages.extend(resolved);
    }
    resolve::detect_conflicts(&pages)?;

    let redirects = pages
        .iter()
        .flat_map(|page| {
            page.redirects.iter().map(|from| RedirectEntry {
                from: from.clone(),
                to: page.path.clone(),
                status: config.redirects.status,
            })
        })
        .collect();

    Ok(SiteManifest { pages, redirects })
}

/// Full HTML document for a resolved page.
pub fn render_page(page: &ResolvedPage, config: &SiteConfig) -> Markup {
    let lang = if page.default_locale {
        config.site.lang.as_str()
    } else {
        page.locale.as_str()
    };
    html! {
        (DOCTYPE)
        html lang=(lang) {
            head {
                (render_head(&page.head))
            }
            body {
                (PreEscaped(&page.body))
            }
        }
    }
}

/// Stub forwarding a static host to `target`.
pub fn render_redirect_stub(target: &str, status: u16) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="UTF-8";
                meta name="robots" content="noindex";
                meta http-equiv="refresh" content={ "0; url=" (target) };
                link rel="canonical" href=(target);
                title { "Redirecting" }
            }
            body data-status=(status) {
                a href=(target) { (target) }
            }
        }
    }
}

/// Write pages, redirect stubs, and `pages.json` under `output_dir`.
pub fn write_site(
    manifest: &SiteManifest,
    config: &SiteConfig,
    output_dir: &Path,
) -> Result<(), BuildError> {
    let layout = config.site.output_layout;
    fs::create_dir_all(output_dir)?;

    for page in &manifest.pages {
        let file = output_dir.join(layout.file_for(&page.path));
        write_file(&file, &render_page(page, config).into_string())?;
    }
    for redirect in &manifest.redirects {
        let file = output_dir.join(layout.file_for(&redirect.from));
        let stub = render_redirect_stub(&redirect.to, redirect.status);
        write_file(&file, &stub.into_string())?;
    }

    let json = serde_json::to_string_pretty(manifest)?;
    fs::write(output_dir.join(PAGES_MANIFEST), json)?;
    Ok(())
}

fn write_file(path: &Path, content: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)
}

/// Resolve and write in one step.
pub fn build(
    templates: &[Box<dyn Template>],
    documents: &[Document],
    config: &SiteConfig,
    output_dir: &Path,
) -> Result<SiteManifest, BuildError> {
    let manifest = resolve_site(templates, documents, config)?;
    write_site(&manifest, config, output_dir)?;
    Ok(manifest)
}
