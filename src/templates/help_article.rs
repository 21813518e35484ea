//! Public help-article pages at `/help/{id}`.
//!
//! Both rich-text fields go through the serializer; a field with no tree
//! renders nothing.

use crate::document::{Document, Field};
use crate::error::ConfigurationError;
use crate::head::HeadConfig;
use crate::richtext::{LexicalSerializer, RichTextSerializer};
use crate::stream::{Localization, StreamConfig, StreamFilter};
use crate::template::{RenderContext, Template};
use maud::{Markup, html};

const FIELDS: &[Field] = &[
    Field::Id,
    Field::Name,
    Field::SecureBodyField,
    Field::ShortDescriptionV2,
];

pub struct HelpArticle {
    stream: StreamConfig,
    serializer: Box<dyn RichTextSerializer>,
}

impl HelpArticle {
    pub fn new() -> Self {
        Self {
            stream: StreamConfig {
                id: "secure-files-stream".to_string(),
                fields: FIELDS.iter().copied().collect(),
                filter: StreamFilter {
                    entity_types: ["helpArticle".to_string()].into(),
                    entity_ids: None,
                },
                localization: Localization {
                    locales: vec!["en".to_string()],
                },
            },
            serializer: Box::new(LexicalSerializer),
        }
    }

    pub fn with_stream(mut self, stream: StreamConfig) -> Self {
        self.stream = stream;
        self
    }

    fn rich_section(&self, document: &Document, field: Field) -> Markup {
        match document.rich_text(field).and_then(|f| f.ast()) {
            Some(ast) => self.serializer.to_markup(ast),
            None => {
                tracing::debug!(document = document.label(), %field, "rich-text field empty");
                html! {}
            }
        }
    }
}

impl Default for HelpArticle {
    fn default() -> Self {
        Self::new()
    }
}

impl Template for HelpArticle {
    fn name(&self) -> &'static str {
        "help-article"
    }

    fn stream(&self) -> &StreamConfig {
        &self.stream
    }

    fn referenced_fields(&self) -> &'static [Field] {
        FIELDS
    }

    fn path(&self, document: &Document) -> Result<String, ConfigurationError> {
        Ok(format!("/help/{}", document.require_id()?))
    }

    fn head_config(
        &self,
        document: &Document,
        _ctx: &RenderContext,
    ) -> Result<HeadConfig, ConfigurationError> {
        Ok(HeadConfig::titled(document.require_name()?))
    }

    fn render(&self, document: &Document, _ctx: &RenderContext) -> Result<Markup, ConfigurationError> {
        let name = document.require_name()?;
        Ok(html! {
            h1 { (name) }
            h4 { "Non-Secure Rich Text Field" }
            (self.rich_section(document, Field::ShortDescriptionV2))
            h4 { "Secure Rich Text Field" }
            (self.rich_section(document, Field::SecureBodyField))
        })
    }
}
