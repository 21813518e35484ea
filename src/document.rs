//! Stream documents: one entity's materialized fields for one locale.
//!
//! Documents are deserialized straight from the JSON the stream produces.
//! Every field is optional at the type level because the stream only
//! materializes fields its declaration lists; resolvers go through the
//! `require_*` accessors, which turn an absent field into a
//! [`ConfigurationError`] carrying the document id instead of panicking.

use crate::error::ConfigurationError;
use crate::richtext::RichTextField;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Every document field a template can reference, by its stream name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Field {
    #[serde(rename = "id")]
    Id,
    #[serde(rename = "name")]
    Name,
    #[serde(rename = "shortDescriptionV2")]
    ShortDescriptionV2,
    #[serde(rename = "c_secureBodyField")]
    SecureBodyField,
    #[serde(rename = "externalAuthorizedIdentities")]
    ExternalAuthorizedIdentities,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Name => "name",
            Field::ShortDescriptionV2 => "shortDescriptionV2",
            Field::SecureBodyField => "c_secureBodyField",
            Field::ExternalAuthorizedIdentities => "externalAuthorizedIdentities",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stream bookkeeping attached to every document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<EntityType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityType {
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_description_v2: Option<RichTextField>,
    #[serde(
        rename = "c_secureBodyField",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub secure_body_field: Option<RichTextField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_authorized_identities: Option<Vec<String>>,
    #[serde(default)]
    pub meta: DocumentMeta,
}

impl Document {
    /// Identifier used in error messages; `"<unknown>"` when `id` is absent.
    pub fn label(&self) -> &str {
        self.id.as_deref().unwrap_or("<unknown>")
    }

    pub fn entity_type(&self) -> Option<&str> {
        self.meta.entity_type.as_ref().map(|t| t.id.as_str())
    }

    /// Whether the document carries a value for `field`.
    pub fn has(&self, field: Field) -> bool {
        match field {
            Field::Id => self.id.is_some(),
            Field::Name => self.name.is_some(),
            Field::ShortDescriptionV2 => self.short_description_v2.is_some(),
            Field::SecureBodyField => self.secure_body_field.is_some(),
            Field::ExternalAuthorizedIdentities => self.external_authorized_identities.is_some(),
        }
    }

    fn missing(&self, field: Field) -> ConfigurationError {
        ConfigurationError::MissingField {
            document: self.label().to_string(),
            field,
        }
    }

    /// Non-empty `id`.
    pub fn require_id(&self) -> Result<&str, ConfigurationError> {
        match self.id.as_deref() {
            None => Err(self.missing(Field::Id)),
            Some("") => Err(ConfigurationError::EmptyField {
                document: self.label().to_string(),
                field: Field::Id,
            }),
            Some(id) => Ok(id),
        }
    }

    pub fn require_name(&self) -> Result<&str, ConfigurationError> {
        self.name.as_deref().ok_or_else(|| self.missing(Field::Name))
    }

    pub fn require_identities(&self) -> Result<&[String], ConfigurationError> {
        self.external_authorized_identities
            .as_deref()
            .ok_or_else(|| self.missing(Field::ExternalAuthorizedIdentities))
    }

    /// Rich-text field by name. `None` is soft-missing data, never an error.
    pub fn rich_text(&self, field: Field) -> Option<&RichTextField> {
        match field {
            Field::ShortDescriptionV2 => self.short_description_v2.as_ref(),
            Field::SecureBodyField => self.secure_body_field.as_ref(),
            _ => None,
        }
    }

    /// Ingestion-time checks that cannot wait for a resolver.
    ///
    /// Identities are later spliced into a quoted claim expression without
    /// escaping, so an embedded `"` is rejected here.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if let Some(identities) = &self.external_authorized_identities
            && let Some(bad) = identities.iter().find(|i| i.contains('"'))
        {
            return Err(ConfigurationError::MalformedIdentity {
                document: self.label().to_string(),
                identity: bad.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::document;

    #[test]
    fn deserializes_stream_shape() {
        let json = r#"{
            "id": "123",
            "name": "Returns",
            "externalAuthorizedIdentities": ["a@x.com"],
            "shortDescriptionV2": {"json": {"root": {"type": "root", "children": []}}},
            "meta": {"entityType": {"id": "helpArticle"}, "locale": "en"}
        }"#;
        let doc: Document = serde_json::from_str(json).unwrap();
        assert_eq!(doc.id.as_deref(), Some("123"));
        assert_eq!(doc.entity_type(), Some("helpArticle"));
        assert_eq!(doc.meta.locale.as_deref(), Some("en"));
        assert!(doc.has(Field::ShortDescriptionV2));
        assert!(!doc.has(Field::SecureBodyField));
    }

    #[test]
    fn secure_body_field_uses_custom_field_name() {
        let json = r#"{"id": "1", "c_secureBodyField": {}}"#;
        let doc: Document = serde_json::from_str(json).unwrap();
        assert!(doc.secure_body_field.is_some());
    }

    #[test]
    fn require_id_rejects_missing_and_empty() {
        let mut doc = document("", "X");
        assert!(matches!(
            doc.require_id(),
            Err(ConfigurationError::EmptyField { field: Field::Id, .. })
        ));
        doc.id = None;
        assert!(matches!(
            doc.require_id(),
            Err(ConfigurationError::MissingField { field: Field::Id, .. })
        ));
    }

    #[test]
    fn require_name_reports_document_id() {
        let mut doc = document("42", "X");
        doc.name = None;
        assert_eq!(
            doc.require_name(),
            Err(ConfigurationError::MissingField {
                document: "42".into(),
                field: Field::Name,
            })
        );
    }

    #[test]
    fn validate_rejects_quoted_identity() {
        let mut doc = document("7", "Admin");
        doc.external_authorized_identities = Some(vec!["ok@x.com".into(), "bad\"@x.com".into()]);
        assert_eq!(
            doc.validate(),
            Err(ConfigurationError::MalformedIdentity {
                document: "7".into(),
                identity: "bad\"@x.com".into(),
            })
        );
    }

    #[test]
    fn validate_accepts_plain_identities() {
        let mut doc = document("7", "Admin");
        doc.external_authorized_identities = Some(vec!["a@x.com".into()]);
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn field_names_round_trip_through_serde() {
        let f: Field = serde_json::from_str("\"c_secureBodyField\"").unwrap();
        assert_eq!(f, Field::SecureBodyField);
        assert_eq!(f.to_string(), "c_secureBodyField");
    }
}
