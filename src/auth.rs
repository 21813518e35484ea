//! Visibility gating by visitor identity.
//!
//! Two separate concerns live here:
//!
//! - **Build time**: an [`AuthScopeResolver`] maps a document to a claim
//!   expression that the hosting runtime evaluates per request. A template
//!   that has no resolver is not gated at all; there is no "open" scope.
//! - **View time**: an [`IdentityProvider`] describes how a page reads the
//!   current visitor's identity once it is being viewed. Nothing about the
//!   visitor is known while pages are generated, so the provider only emits
//!   a client-side snippet that fills a placeholder element.

use crate::document::Document;
use crate::error::ConfigurationError;

/// Build the claim expression admitting exactly `identities`.
///
/// `(claims.email in ["a@x.com","b@y.com"])`: each identity quoted, joined
/// by `,` with no whitespace. An empty list yields `(claims.email in [])`,
/// which the authorization runtime treats as deny-all.
///
/// Identities are not escaped; [`Document::validate`] rejects embedded
/// quotes at ingestion.
pub fn email_scope<S: AsRef<str>>(identities: &[S]) -> String {
    let quoted: Vec<String> = identities
        .iter()
        .map(|identity| format!("\"{}\"", identity.as_ref()))
        .collect();
    format!("(claims.email in [{}])", quoted.join(","))
}

/// Build-time capability: document → claim expression.
pub trait AuthScopeResolver: Send + Sync {
    fn resolve(&self, document: &Document) -> Result<String, ConfigurationError>;
}

/// Gate on the document's `externalAuthorizedIdentities`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorizedIdentities;

impl AuthScopeResolver for AuthorizedIdentities {
    fn resolve(&self, document: &Document) -> Result<String, ConfigurationError> {
        Ok(email_scope(document.require_identities()?))
    }
}

/// View-time capability: where the current visitor's identity comes from.
pub trait IdentityProvider: Send + Sync {
    /// Client-side script writing the visitor identity into the element
    /// with id `element_id`.
    fn placeholder_script(&self, element_id: &str) -> String;
}

/// Reads the visitor email from the session global the hosting runtime
/// injects into every gated page (`YEXT_AUTH.visitor.email`).
#[derive(Debug, Clone)]
pub struct SessionGlobal {
    pub expression: String,
}

impl Default for SessionGlobal {
    fn default() -> Self {
        Self {
            expression: "YEXT_AUTH.visitor.email".to_string(),
        }
    }
}

impl IdentityProvider for SessionGlobal {
    fn placeholder_script(&self, element_id: &str) -> String {
        // textContent, not innerHTML: the identity is visitor-controlled.
        format!(
            "document.getElementById({}).textContent = {};",
            serde_json::Value::String(element_id.to_string()),
            self.expression
        )
    }
}
