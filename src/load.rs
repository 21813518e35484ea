//! Loading stream documents from disk.
//!
//! Stands in for the stream fetch: a directory of `*.json` files, each
//! holding either one document or an array of documents, in the shape the
//! Knowledge Graph stream emits.
//!
//! ```text
//! documents/
//! ├── config.toml              # Site config (optional)
//! ├── help/
//! │   ├── 123.json             # { "id": "123", "name": "Returns", "meta": {...} }
//! │   └── batch.json           # [ {...}, {...} ]
//! └── admin.json
//! ```
//!
//! Files are read in sorted path order so builds are reproducible. Every
//! document passes [`Document::validate`] before it is returned; the first
//! failure aborts loading.

use crate::document::Document;
use crate::error::ConfigurationError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Invalid document in {path}: {source}")]
    Invalid {
        path: PathBuf,
        source: ConfigurationError,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DocumentFile {
    Many(Vec<Document>),
    One(Box<Document>),
}

/// A loaded document and the file it came from.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub source: PathBuf,
    pub document: Document,
}

/// Every `*.json` file under `root`, sorted.
fn document_files(root: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        let is_json = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        // Skip dotfiles and anything we wrote ourselves.
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        if entry.file_type().is_file() && is_json && !hidden && entry.file_name() != "pages.json" {
            files.push(path.to_path_buf());
        }
    }
    Ok(files)
}

/// Parse one file into documents.
pub fn parse_file(path: &Path) -> Result<Vec<Document>, LoadError> {
    let content = fs::read_to_string(path)?;
    let parsed: DocumentFile = serde_json::from_str(&content).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let documents = match parsed {
        DocumentFile::Many(docs) => docs,
        DocumentFile::One(doc) => vec![*doc],
    };
    for doc in &documents {
        doc.validate().map_err(|source| LoadError::Invalid {
            path: path.to_path_buf(),
            source,
        })?;
    }
    Ok(documents)
}

/// Load every document under `root`, keeping track of its source file.
pub fn load_documents(root: &Path) -> Result<Vec<LoadedDocument>, LoadError> {
    let mut loaded = Vec::new();
    for path in document_files(root)? {
        let relative = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
        for document in parse_file(&path)? {
            loaded.push(LoadedDocument {
                source: relative.clone(),
                document,
            });
        }
    }
    tracing::debug!(root = %root.display(), documents = loaded.len(), "loaded documents");
    Ok(loaded)
}

/// The documents alone, in load order.
pub fn documents(loaded: &[LoadedDocument]) -> Vec<Document> {
    loaded.iter().map(|l| l.document.clone()).collect()
}
