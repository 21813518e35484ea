//! Single gated page at `/secure`.
//!
//! The stream is pinned to one entity id, so the constant path cannot
//! collide. The page is visible only to the identities listed on the
//! document, and greets the visitor with an identity the hosting runtime
//! fills in at view time.
//!
//! The body shows one embedded image of each rich-text field rather than
//! the whole field: the first child of the first block for the public
//! field, the second child of the first block for the secure one. Images
//! are located with the serializer's block accessor; the untyped
//! positional lookup in `compat` is only a fallback for trees whose media
//! nodes are not typed as images.

use crate::auth::{AuthScopeResolver, AuthorizedIdentities, IdentityProvider, SessionGlobal};
use crate::document::{Document, Field};
use crate::error::ConfigurationError;
use crate::head::HeadConfig;
use crate::richtext::{LexicalSerializer, RichTextSerializer, compat};
use crate::stream::{Localization, StreamConfig, StreamFilter};
use crate::template::{RenderContext, Template};
use maud::{Markup, PreEscaped, html};

const FIELDS: &[Field] = &[
    Field::Id,
    Field::Name,
    Field::SecureBodyField,
    Field::ShortDescriptionV2,
    Field::ExternalAuthorizedIdentities,
];

const SECURE_ENTITY_ID: &str = "17665096328731";
const VISITOR_ELEMENT_ID: &str = "user";

/// Where to find the image shown for one rich-text field.
struct MediaSlot {
    field: Field,
    /// Top-level block holding the image.
    block: usize,
    /// Position of the image among the block's children.
    child: usize,
}

const PUBLIC_IMAGE: MediaSlot = MediaSlot {
    field: Field::ShortDescriptionV2,
    block: 0,
    child: 0,
};

const SECURE_IMAGE: MediaSlot = MediaSlot {
    field: Field::SecureBodyField,
    block: 0,
    child: 1,
};

pub struct SecureAdmin {
    stream: StreamConfig,
    serializer: Box<dyn RichTextSerializer>,
    identity: Box<dyn IdentityProvider>,
    scope: AuthorizedIdentities,
}

impl SecureAdmin {
    pub fn new() -> Self {
        Self {
            stream: StreamConfig {
                id: "secure-files-stream-admin".to_string(),
                fields: FIELDS.iter().copied().collect(),
                filter: StreamFilter {
                    entity_types: ["helpArticle".to_string()].into(),
                    entity_ids: Some([SECURE_ENTITY_ID.to_string()].into()),
                },
                localization: Localization {
                    locales: vec!["en".to_string()],
                },
            },
            serializer: Box::new(LexicalSerializer),
            identity: Box::new(SessionGlobal::default()),
            scope: AuthorizedIdentities,
        }
    }

    pub fn with_stream(mut self, stream: StreamConfig) -> Self {
        self.stream = stream;
        self
    }

    pub fn with_identity_provider(mut self, provider: Box<dyn IdentityProvider>) -> Self {
        self.identity = provider;
        self
    }

    fn media_src<'a>(&self, document: &'a Document, slot: &MediaSlot) -> Option<&'a str> {
        let ast = document.rich_text(slot.field)?.ast()?;
        if let Some(src) = self.serializer.block_media_src(ast, slot.block, slot.child) {
            return Some(src);
        }
        let legacy = compat::positional_media_src(ast, &[slot.block, slot.child]);
        if legacy.is_some() {
            tracing::warn!(
                document = document.label(),
                field = %slot.field,
                "media found only by positional lookup"
            );
        }
        legacy
    }
}

impl Default for SecureAdmin {
    fn default() -> Self {
        Self::new()
    }
}

impl Template for SecureAdmin {
    fn name(&self) -> &'static str {
        "secure-admin"
    }

    fn stream(&self) -> &StreamConfig {
        &self.stream
    }

    fn referenced_fields(&self) -> &'static [Field] {
        FIELDS
    }

    fn is_singular(&self) -> bool {
        true
    }

    fn path(&self, _document: &Document) -> Result<String, ConfigurationError> {
        Ok("/secure".to_string())
    }

    fn head_config(
        &self,
        document: &Document,
        _ctx: &RenderContext,
    ) -> Result<HeadConfig, ConfigurationError> {
        Ok(HeadConfig::titled(document.require_name()?))
    }

    fn auth_scope(&self) -> Option<&dyn AuthScopeResolver> {
        Some(&self.scope)
    }

    fn render(&self, document: &Document, _ctx: &RenderContext) -> Result<Markup, ConfigurationError> {
        let name = document.require_name()?;
        let public_src = self.media_src(document, &PUBLIC_IMAGE);
        let secure_src = self.media_src(document, &SECURE_IMAGE);
        let script = self.identity.placeholder_script(VISITOR_ELEMENT_ID);

        Ok(html! {
            strong { (name) }
            br;
            strong { "Hello " span id=(VISITOR_ELEMENT_ID) {} "!" }
            br;
            p {
                "Below are two images, the first is an insecure link and the second is a secure link. "
                "To use this page, the logged in user must be included in the following emails set on the entity."
            }
            br;
            h4 { "Non-Secure Rich Text Image" }
            @if let Some(src) = public_src {
                img src=(src);
            }
            br;
            h4 { "Secure Rich Text Image" }
            @if let Some(src) = secure_src {
                img src=(src);
            }
            script { (PreEscaped(script)) }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::richtext::{Node, RichTextField};
    use crate::test_helpers::{ctx, help_article, image_node, paragraph, rich_text, text_node};

    fn admin_doc(identities: &[&str]) -> Document {
        let mut doc = help_article("999", "Admin Doc");
        doc.external_authorized_identities =
            Some(identities.iter().map(|s| s.to_string()).collect());
        doc
    }

    #[test]
    fn path_is_constant() {
        let t = SecureAdmin::new();
        assert_eq!(t.path(&admin_doc(&[])).unwrap(), "/secure");
        assert_eq!(t.path(&Document::default()).unwrap(), "/secure");
    }

    #[test]
    fn stream_pinned_to_one_entity() {
        let t = SecureAdmin::new();
        assert!(t.is_singular());
        let ids = t.stream().filter.entity_ids.as_ref().unwrap();
        assert_eq!(ids.len(), 1);
        assert!(ids.contains(SECURE_ENTITY_ID));
    }

    #[test]
    fn auth_scope_lists_identities() {
        let t = SecureAdmin::new();
        let scope = t
            .auth_scope()
            .unwrap()
            .resolve(&admin_doc(&["a@x.com", "b@y.com"]))
            .unwrap();
        assert_eq!(scope, r#"(claims.email in ["a@x.com","b@y.com"])"#);
    }

    #[test]
    fn empty_identities_deny_all() {
        let t = SecureAdmin::new();
        let scope = t.auth_scope().unwrap().resolve(&admin_doc(&[])).unwrap();
        assert_eq!(scope, "(claims.email in [])");
    }

    #[test]
    fn secure_image_is_second_child_of_first_block() {
        let mut doc = admin_doc(&[]);
        doc.short_description_v2 = Some(RichTextField {
            json: Some(rich_text(vec![paragraph(vec![
                image_node("public-first.png"),
                image_node("public-second.png"),
            ])])),
        });
        doc.secure_body_field = Some(RichTextField {
            json: Some(rich_text(vec![paragraph(vec![
                image_node("first.png"),
                image_node("second.png"),
            ])])),
        });
        let html = SecureAdmin::new()
            .render(&doc, &ctx("/secure"))
            .unwrap()
            .into_string();
        assert!(html.contains(r#"<h4>Non-Secure Rich Text Image</h4><img src="public-first.png">"#));
        assert!(html.contains(r#"<h4>Secure Rich Text Image</h4><img src="second.png">"#));
        assert!(!html.contains(r#"<img src="first.png">"#));
    }

    #[test]
    fn secure_image_alone_in_first_position_is_not_shown() {
        let mut doc = admin_doc(&[]);
        doc.secure_body_field = Some(RichTextField {
            json: Some(rich_text(vec![paragraph(vec![image_node("only.png")])])),
        });
        let html = SecureAdmin::new()
            .render(&doc, &ctx("/secure"))
            .unwrap()
            .into_string();
        assert!(!html.contains("only.png"));
    }

    #[test]
    fn renders_image_of_each_field() {
        let mut doc = admin_doc(&[]);
        doc.short_description_v2 = Some(RichTextField {
            json: Some(rich_text(vec![paragraph(vec![image_node("public.png")])])),
        });
        doc.secure_body_field = Some(RichTextField {
            json: Some(rich_text(vec![paragraph(vec![
                text_node("caption", 0),
                image_node("secure.png"),
            ])])),
        });
        let html = SecureAdmin::new()
            .render(&doc, &ctx("/secure"))
            .unwrap()
            .into_string();
        assert!(html.contains(r#"<img src="public.png">"#));
        assert!(html.contains(r#"<img src="secure.png">"#));
    }

    #[test]
    fn falls_back_to_positional_lookup_for_untyped_media() {
        let mut doc = admin_doc(&[]);
        doc.secure_body_field = Some(RichTextField {
            json: Some(rich_text(vec![paragraph(vec![
                text_node("caption", 0),
                Node {
                    kind: "custom-embed".into(),
                    src: Some("legacy.png".into()),
                    ..Node::default()
                },
            ])])),
        });
        let html = SecureAdmin::new()
            .render(&doc, &ctx("/secure"))
            .unwrap()
            .into_string();
        assert!(html.contains(r#"<img src="legacy.png">"#));
    }

    #[test]
    fn missing_media_renders_no_image() {
        let mut doc = admin_doc(&[]);
        doc.short_description_v2 = Some(RichTextField {
            json: Some(rich_text(vec![])),
        });
        let html = SecureAdmin::new()
            .render(&doc, &ctx("/secure"))
            .unwrap()
            .into_string();
        assert!(!html.contains("<img"));
        assert!(html.contains("Secure Rich Text Image"));
    }

    #[test]
    fn emits_visitor_placeholder_and_script() {
        let html = SecureAdmin::new()
            .render(&admin_doc(&[]), &ctx("/secure"))
            .unwrap()
            .into_string();
        assert!(html.contains(r#"<span id="user"></span>"#));
        assert!(html.contains("YEXT_AUTH.visitor.email"));
    }

    struct FixedProvider;

    impl IdentityProvider for FixedProvider {
        fn placeholder_script(&self, element_id: &str) -> String {
            format!("fill('{element_id}');")
        }
    }

    #[test]
    fn identity_provider_is_injectable() {
        let html = SecureAdmin::new()
            .with_identity_provider(Box::new(FixedProvider))
            .render(&admin_doc(&[]), &ctx("/secure"))
            .unwrap()
            .into_string();
        assert!(html.contains("<script>fill('user');</script>"));
        assert!(!html.contains("YEXT_AUTH"));
    }
}
