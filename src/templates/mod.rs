//! Templates shipped with the site.
//!
//! | Template | Stream | Path | Gated |
//! |----------|--------|------|-------|
//! | [`HelpArticle`] | `secure-files-stream` | `/help/{id}` | no |
//! | [`SecureAdmin`] | `secure-files-stream-admin` | `/secure` | yes |

mod help_article;
mod secure_admin;

pub use help_article::HelpArticle;
pub use secure_admin::SecureAdmin;

use crate::template::Template;

/// Every template, in build order.
pub fn all() -> Vec<Box<dyn Template>> {
    vec![Box::new(HelpArticle::new()), Box::new(SecureAdmin::new())]
}

/// Look up a template by [`Template::name`].
pub fn find(name: &str) -> Option<Box<dyn Template>> {
    all().into_iter().find(|t| t.name() == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn template_names_are_unique() {
        let names: BTreeSet<&str> = all().iter().map(|t| t.name()).collect();
        assert_eq!(names.len(), all().len());
    }

    #[test]
    fn every_template_lists_its_referenced_fields() {
        for template in all() {
            let stream = template.stream();
            assert!(stream.validate().is_ok(), "{}", template.name());
            assert!(
                stream.check_fields(template.referenced_fields()).is_ok(),
                "{}",
                template.name()
            );
        }
    }

    #[test]
    fn find_by_name() {
        assert!(find("secure-admin").is_some());
        assert!(find("nope").is_none());
    }
}
