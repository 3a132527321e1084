//! Template manager - parse once, clone per mount.
//!
//! A builder's markup must produce exactly one root element (whitespace-only
//! text around it is tolerated and dropped). The parsed root is kept
//! pristine; every mount works on a [`Template::instance`] deep clone, so
//! marker attributes survive in the template even after an instance has had
//! its markers stripped.

use crate::dom::{markup, Node};
use crate::error::{Error, Result};

/// A validated single-root markup fragment.
pub struct Template {
    root: Node,
}

impl Template {
    /// Parse and validate `markup`.
    ///
    /// Fails with [`Error::InvalidTemplate`] unless exactly one root element
    /// (and no stray root text) results.
    pub fn parse(markup: &str) -> Result<Template> {
        let roots = markup::parse_fragment(markup)?;

        let mut elements = Vec::new();
        let mut significant = 0usize;
        for node in roots {
            if node.is_element() {
                significant += 1;
                elements.push(node);
            } else if !node.text_content().trim().is_empty() {
                significant += 1;
            }
        }

        match (elements.len(), significant) {
            (1, 1) => Ok(Template {
                root: elements.remove(0),
            }),
            _ => Err(Error::InvalidTemplate { roots: significant }),
        }
    }

    /// The pristine parsed root.
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Fresh deep clone for one mount.
    pub fn instance(&self) -> Node {
        self.root.deep_clone()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_root_ok() {
        let template = Template::parse("<div><span>x</span></div>").unwrap();
        assert_eq!(template.root().tag().as_deref(), Some("div"));
    }

    #[test]
    fn test_surrounding_whitespace_ok() {
        let template = Template::parse("\n  <p>hi</p>\n").unwrap();
        assert_eq!(template.root().tag().as_deref(), Some("p"));
    }

    #[test]
    fn test_zero_roots_fails() {
        assert!(matches!(
            Template::parse("   "),
            Err(Error::InvalidTemplate { roots: 0 })
        ));
    }

    #[test]
    fn test_multiple_roots_fail() {
        assert!(matches!(
            Template::parse("<div></div><div></div>"),
            Err(Error::InvalidTemplate { roots: 2 })
        ));
    }

    #[test]
    fn test_root_text_fails() {
        assert!(matches!(
            Template::parse("hello <b>world</b>"),
            Err(Error::InvalidTemplate { roots: 2 })
        ));
    }

    #[test]
    fn test_instances_are_independent() {
        let template = Template::parse(r#"<p data-ref-x="">hi</p>"#).unwrap();
        let first = template.instance();
        first.remove_attribute("data-ref-x");
        first.set_text("changed");

        let second = template.instance();
        assert!(second.has_attribute("data-ref-x"), "template stays pristine");
        assert_eq!(second.text_content(), "hi");
    }
}
