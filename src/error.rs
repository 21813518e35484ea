//! Build-time error taxonomy shared by every resolver.
//!
//! Two classes of failure abort a stream:
//!
//! - [`ConfigurationError`]: a template, stream declaration or document is
//!   inconsistent with itself (unlisted field, missing field, malformed
//!   identity, a singular stream with no document or several).
//! - [`ConflictError`]: two resolved pages disagree about the shared path
//!   namespace. Only detectable once every document has been resolved.
//!
//! Missing *optional* data (an absent rich-text field) is not an error at
//! all; renderers absorb it and emit nothing for that section.
//!
//! Every variant carries the offending document id where one exists, so the
//! CLI can point at the exact record that broke the build.

use crate::document::Field;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("stream '{stream}': template references field '{field}' which is not listed in stream fields")]
    UnlistedField { stream: String, field: Field },
    #[error("document '{document}': required field '{field}' is missing")]
    MissingField { document: String, field: Field },
    #[error("document '{document}': field '{field}' must not be empty")]
    EmptyField { document: String, field: Field },
    #[error("document '{document}': path {path:?} must be absolute and normalized, without whitespace, query or fragment")]
    InvalidPath { document: String, path: String },
    #[error("document '{document}': identity {identity:?} contains an unescaped double quote")]
    MalformedIdentity { document: String, identity: String },
    #[error(
        "stream '{stream}' [{locale}] must resolve to exactly one document for a fixed path, found {}: {documents:?}",
        .documents.len()
    )]
    SingularStream {
        stream: String,
        locale: String,
        documents: Vec<String>,
    },
    #[error("stream '{stream}': {reason}")]
    InvalidStream { stream: String, reason: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConflictError {
    #[error("documents '{first}' and '{second}' both resolve to path {path}")]
    DuplicatePath {
        path: String,
        first: String,
        second: String,
    },
    #[error("documents '{first}' and '{second}' both claim redirect {path}")]
    DuplicateRedirect {
        path: String,
        first: String,
        second: String,
    },
    #[error("document '{document}' redirects {path} to itself")]
    SelfRedirect { path: String, document: String },
    #[error("redirect {path} from document '{document}' shadows the page of document '{page}'")]
    RedirectShadowsPage {
        path: String,
        document: String,
        page: String,
    },
}
