//! CLI output formatting.
//!
//! Output is page-centric: each line leads with the page path, followed by
//! the document that produced it. Gated pages and redirects are shown as
//! indented context lines underneath.
//!
//! ```text
//! help-article (secure-files-stream)
//! 001 /help/123 ← 123 "Returns" [en]
//! 002 /help/456 ← 456 "Shipping" [en]
//!     Redirect: /shipping (301)
//!
//! secure-admin (secure-files-stream-admin)
//! 001 /secure ← 17665096328731 "Admin Doc" [en]
//!     Auth: (claims.email in ["a@x.com"])
//!
//! Generated 3 pages, 1 redirect, 1 gated
//! ```
//!
//! Each `format_*` function is pure and returns lines for testability; the
//! `print_*` wrappers write them to stdout.

use crate::load::LoadedDocument;
use crate::resolve::ResolvedPage;
use crate::site::SiteManifest;
use crate::template::Template;

fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

fn page_line(index: usize, page: &ResolvedPage) -> String {
    format!(
        "{} {} ← {} \"{}\" [{}]",
        format_index(index),
        page.path,
        page.document_id,
        page.head.title,
        page.locale
    )
}

fn page_context(page: &ResolvedPage, status: u16) -> Vec<String> {
    let mut lines = Vec::new();
    for redirect in &page.redirects {
        lines.push(format!("    Redirect: {redirect} ({status})"));
    }
    if let Some(scope) = &page.auth_scope {
        lines.push(format!("    Auth: {scope}"));
    }
    lines
}

/// Pages grouped by template, in manifest order, with a summary line.
pub fn format_build_output(manifest: &SiteManifest) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current: Option<&str> = None;
    let mut index = 0;

    for page in &manifest.pages {
        if current != Some(page.template.as_str()) {
            if current.is_some() {
                lines.push(String::new());
            }
            lines.push(format!("{} ({})", page.template, page.stream));
            current = Some(page.template.as_str());
            index = 0;
        }
        index += 1;
        lines.push(page_line(index, page));
        let status = manifest
            .redirects
            .iter()
            .find(|r| r.to == page.path)
            .map(|r| r.status)
            .unwrap_or(301);
        lines.extend(page_context(page, status));
    }

    if !manifest.pages.is_empty() {
        lines.push(String::new());
    }
    lines.push(format!(
        "Generated {}, {}, {} gated",
        plural(manifest.pages.len(), "page"),
        plural(manifest.redirects.len(), "redirect"),
        manifest.gated_pages().count()
    ));
    lines
}

pub fn print_build_output(manifest: &SiteManifest) {
    for line in format_build_output(manifest) {
        println!("{}", line);
    }
}

/// Loaded documents, one line each with their source file.
pub fn format_load_output(loaded: &[LoadedDocument]) -> Vec<String> {
    let mut lines = vec!["Documents".to_string()];
    for (i, doc) in loaded.iter().enumerate() {
        let name = doc.document.name.as_deref().unwrap_or("(unnamed)");
        let entity_type = doc.document.entity_type().unwrap_or("?");
        lines.push(format!(
            "{} {} \"{}\" ({})",
            format_index(i + 1),
            doc.document.label(),
            name,
            entity_type
        ));
        lines.push(format!("    Source: {}", doc.source.display()));
    }
    lines
}

pub fn print_load_output(loaded: &[LoadedDocument]) {
    for line in format_load_output(loaded) {
        println!("{}", line);
    }
}

/// Stream declarations of every template.
pub fn format_streams(templates: &[Box<dyn Template>]) -> Vec<String> {
    let mut lines = Vec::new();
    for template in templates {
        let stream = template.stream();
        lines.push(format!("{} ({})", template.name(), stream.id));
        let fields: Vec<&str> = stream.fields.iter().map(|f| f.as_str()).collect();
        lines.push(format!("    Fields: {}", fields.join(", ")));
        let types: Vec<&str> = stream.filter.entity_types.iter().map(String::as_str).collect();
        lines.push(format!("    Entity types: {}", types.join(", ")));
        if let Some(ids) = &stream.filter.entity_ids {
            let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
            lines.push(format!("    Entity ids: {}", ids.join(", ")));
        }
        lines.push(format!(
            "    Locales: {}",
            stream.localization.locales.join(", ")
        ));
        lines.push(format!(
            "    Gated: {}",
            if template.auth_scope().is_some() { "yes" } else { "no" }
        ));
    }
    lines
}

pub fn print_streams(templates: &[Box<dyn Template>]) {
    for line in format_streams(templates) {
        println!("{}", line);
    }
}

/// Every resolver output for one page, as shown by `resolve`.
pub fn format_page_detail(page: &ResolvedPage) -> Vec<String> {
    let mut lines = vec![
        format!("Template: {}", page.template),
        format!("Document: {} [{}]", page.document_id, page.locale),
        format!("Path: {}", page.path),
    ];
    if page.redirects.is_empty() {
        lines.push("Redirects: (none)".to_string());
    } else {
        lines.push(format!("Redirects: {}", page.redirects.join(", ")));
    }
    lines.push(format!("Title: {}", page.head.title));
    if let Some(charset) = &page.head.charset {
        lines.push(format!("Charset: {charset}"));
    }
    if let Some(viewport) = &page.head.viewport {
        lines.push(format!("Viewport: {viewport}"));
    }
    lines.push(format!(
        "Auth scope: {}",
        page.auth_scope.as_deref().unwrap_or("(not gated)")
    ));
    lines.push("Body:".to_string());
    lines.push(format!("    {}", page.body));
    lines
}

pub fn print_page_detail(page: &ResolvedPage) {
    for line in format_page_detail(page) {
        println!("{}", line);
    }
}
