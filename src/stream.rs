//! Stream declarations and document selection.
//!
//! A stream is the filtered, localized slice of Knowledge Graph entities a
//! template is built from. The declaration has the same shape the Sites
//! system consumes:
//!
//! ```json
//! {
//!   "$id": "secure-files-stream",
//!   "fields": ["id", "name", "c_secureBodyField", "shortDescriptionV2"],
//!   "filter": { "entityTypes": ["helpArticle"] },
//!   "localization": { "locales": ["en"] }
//! }
//! ```
//!
//! [`StreamConfig::select`] plays the part of the stream: it keeps the
//! documents that pass the filter, projects each one down to the declared
//! fields, and expands it into one [`StreamItem`] per locale.

use crate::document::{Document, Field};
use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StreamConfig {
    #[serde(rename = "$id")]
    pub id: String,
    pub fields: BTreeSet<Field>,
    pub filter: StreamFilter,
    pub localization: Localization,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StreamFilter {
    pub entity_types: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_ids: Option<BTreeSet<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Localization {
    /// Ordered; the first locale is the default and owns the unprefixed paths.
    pub locales: Vec<String>,
}

/// One (document, locale) pair handed to a template.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamItem {
    pub document: Document,
    pub locale: String,
}

impl StreamConfig {
    fn invalid(&self, reason: impl Into<String>) -> ConfigurationError {
        ConfigurationError::InvalidStream {
            stream: self.id.clone(),
            reason: reason.into(),
        }
    }

    /// Structural checks on the declaration itself.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.id.trim().is_empty() {
            return Err(self.invalid("$id must not be empty"));
        }
        if self.filter.entity_types.is_empty() {
            return Err(self.invalid("filter.entityTypes must not be empty"));
        }
        if self.filter.entity_ids.as_ref().is_some_and(|ids| ids.is_empty()) {
            return Err(self.invalid("filter.entityIds, when present, must not be empty"));
        }
        if self.localization.locales.is_empty() {
            return Err(self.invalid("localization.locales must not be empty"));
        }
        let unique: BTreeSet<&String> = self.localization.locales.iter().collect();
        if unique.len() != self.localization.locales.len() {
            return Err(self.invalid("localization.locales contains duplicates"));
        }
        Ok(())
    }

    /// Fail unless every field in `referenced` is materialized by this stream.
    pub fn check_fields(&self, referenced: &[Field]) -> Result<(), ConfigurationError> {
        match referenced.iter().find(|f| !self.fields.contains(*f)) {
            Some(&field) => Err(ConfigurationError::UnlistedField {
                stream: self.id.clone(),
                field,
            }),
            None => Ok(()),
        }
    }

    pub fn default_locale(&self) -> Option<&str> {
        self.localization.locales.first().map(String::as_str)
    }

    /// Whether a document belongs to this stream, ignoring locale.
    pub fn matches(&self, document: &Document) -> bool {
        let type_ok = document
            .entity_type()
            .is_some_and(|t| self.filter.entity_types.contains(t));
        let id_ok = match (&self.filter.entity_ids, document.id.as_deref()) {
            (None, _) => true,
            (Some(ids), Some(id)) => ids.contains(id),
            (Some(_), None) => false,
        };
        type_ok && id_ok
    }

    /// Strip every field the stream does not list.
    ///
    /// Stream metadata is always kept; it is not a document field.
    pub fn project(&self, document: &Document) -> Document {
        let keep = |f: Field| self.fields.contains(&f);
        Document {
            id: document.id.clone().filter(|_| keep(Field::Id)),
            name: document.name.clone().filter(|_| keep(Field::Name)),
            short_description_v2: document
                .short_description_v2
                .clone()
                .filter(|_| keep(Field::ShortDescriptionV2)),
            secure_body_field: document
                .secure_body_field
                .clone()
                .filter(|_| keep(Field::SecureBodyField)),
            external_authorized_identities: document
                .external_authorized_identities
                .clone()
                .filter(|_| keep(Field::ExternalAuthorizedIdentities)),
            meta: document.meta.clone(),
        }
    }

    /// Enumerate the (document, locale) pairs this stream yields.
    ///
    /// A document tagged with a locale is yielded once, for that locale, if
    /// the stream declares it. An untagged document is yielded once per
    /// declared locale. Output order follows input order, then locale order.
    pub fn select(&self, documents: &[Document]) -> Vec<StreamItem> {
        let mut items = Vec::new();
        for document in documents.iter().filter(|d| self.matches(d)) {
            let projected = self.project(document);
            match document.meta.locale.as_deref() {
                Some(locale) => {
                    if self.localization.locales.iter().any(|l| l == locale) {
                        items.push(StreamItem {
                            document: projected,
                            locale: locale.to_string(),
                        });
                    } else {
                        tracing::debug!(
                            stream = %self.id,
                            document = document.label(),
                            locale,
                            "skipping document in undeclared locale"
                        );
                    }
                }
                None => {
                    for locale in &self.localization.locales {
                        items.push(StreamItem {
                            document: projected.clone(),
                            locale: locale.clone(),
                        });
                    }
                }
            }
        }
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{document, help_article, stream};

    #[test]
    fn parses_declaration_shape() {
        let json = r#"{
            "$id": "secure-files-stream-admin",
            "fields": ["id", "name", "externalAuthorizedIdentities"],
            "filter": {"entityTypes": ["helpArticle"], "entityIds": ["17665096328731"]},
            "localization": {"locales": ["en"]}
        }"#;
        let config: StreamConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.id, "secure-files-stream-admin");
        assert!(config.fields.contains(&Field::ExternalAuthorizedIdentities));
        assert_eq!(
            config.filter.entity_ids.as_ref().map(|ids| ids.len()),
            Some(1)
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn unknown_filter_key_rejected() {
        let json = r#"{
            "$id": "s", "fields": [],
            "filter": {"entityTypes": ["a"], "savedFilterIds": ["x"]},
            "localization": {"locales": ["en"]}
        }"#;
        assert!(serde_json::from_str::<StreamConfig>(json).is_err());
    }

    #[test]
    fn validate_rejects_empty_locales_and_duplicates() {
        let mut s = stream(&[Field::Id]);
        s.localization.locales.clear();
        assert!(s.validate().is_err());
        s.localization.locales = vec!["en".into(), "en".into()];
        assert!(s.validate().is_err());
    }

    #[test]
    fn check_fields_reports_first_unlisted() {
        let s = stream(&[Field::Id]);
        assert_eq!(
            s.check_fields(&[Field::Id, Field::Name]),
            Err(ConfigurationError::UnlistedField {
                stream: "test-stream".into(),
                field: Field::Name,
            })
        );
        assert!(s.check_fields(&[Field::Id]).is_ok());
    }

    #[test]
    fn matches_entity_type_and_id_allow_list() {
        let mut s = stream(&[Field::Id]);
        let article = help_article("1", "A");
        let mut other = help_article("2", "B");
        other.meta.entity_type = Some(crate::document::EntityType {
            id: "location".into(),
        });
        assert!(s.matches(&article));
        assert!(!s.matches(&other));

        s.filter.entity_ids = Some(["9".to_string()].into());
        assert!(!s.matches(&article));
    }

    #[test]
    fn untyped_document_never_matches() {
        let s = stream(&[Field::Id]);
        assert!(!s.matches(&document("1", "A")));
    }

    #[test]
    fn project_drops_unlisted_fields() {
        let s = stream(&[Field::Id]);
        let projected = s.project(&help_article("1", "A"));
        assert_eq!(projected.id.as_deref(), Some("1"));
        assert!(projected.name.is_none());
        assert_eq!(projected.entity_type(), Some("helpArticle"));
    }

    #[test]
    fn select_expands_untagged_documents_per_locale() {
        let mut s = stream(&[Field::Id, Field::Name]);
        s.localization.locales = vec!["en".into(), "fr".into()];
        let items = s.select(&[help_article("1", "A")]);
        let locales: Vec<&str> = items.iter().map(|i| i.locale.as_str()).collect();
        assert_eq!(locales, vec!["en", "fr"]);
    }

    #[test]
    fn select_keeps_tagged_documents_in_declared_locales_only() {
        let s = stream(&[Field::Id, Field::Name]);
        let mut en = help_article("1", "A");
        en.meta.locale = Some("en".into());
        let mut de = help_article("2", "B");
        de.meta.locale = Some("de".into());
        let items = s.select(&[en, de]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].document.id.as_deref(), Some("1"));
    }
}
