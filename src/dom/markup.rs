//! Minimal markup fragment parser.
//!
//! Parses the subset of markup that block builders write: elements with
//! attributes (quoted, unquoted or bare), text, comments, void elements and
//! `/>` self-closing syntax. Deliberately *not* an HTML5 tree-construction
//! parser - no implied tags, no foster parenting - so a template round-trips
//! verbatim and marker attributes stay exactly where the author put them.
//!
//! Entities are passed through untouched; the runtime adds no escaping
//! beyond what the host provides.

use super::Node;
use crate::error::{Error, Result};

/// Elements that never take children.
const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta",
    "param", "source", "track", "wbr",
];

/// Parse a markup fragment into its root nodes.
pub(crate) fn parse_fragment(input: &str) -> Result<Vec<Node>> {
    Parser { src: input, pos: 0 }.fragment()
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn eof(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn bump(&mut self, bytes: usize) {
        self.pos += bytes;
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.rest().chars().next() {
            if c.is_whitespace() {
                self.bump(c.len_utf8());
            } else {
                break;
            }
        }
    }

    fn fragment(&mut self) -> Result<Vec<Node>> {
        let mut roots: Vec<Node> = Vec::new();
        let mut stack: Vec<Node> = Vec::new();

        while !self.eof() {
            if self.rest().starts_with("<!--") {
                match self.rest().find("-->") {
                    Some(end) => self.bump(end + 3),
                    None => return Err(Error::Markup("unterminated comment".into())),
                }
            } else if self.rest().starts_with("</") {
                let tag = self.close_tag()?;
                match stack.pop() {
                    Some(open) if open.tag().as_deref() == Some(tag.as_str()) => {}
                    Some(open) => {
                        return Err(Error::Markup(format!(
                            "mismatched `</{tag}>`, open element is `<{}>`",
                            open.tag().unwrap_or_default()
                        )));
                    }
                    None => return Err(Error::Markup(format!("unexpected `</{tag}>`"))),
                }
            } else if self.rest().starts_with('<') {
                let (node, closed) = self.open_tag()?;
                attach(&mut roots, &stack, &node);
                if !closed {
                    stack.push(node);
                }
            } else {
                let end = self.rest().find('<').unwrap_or(self.rest().len());
                let text = &self.rest()[..end];
                self.bump(end);
                if !text.is_empty() {
                    attach(&mut roots, &stack, &Node::text(text));
                }
            }
        }

        if let Some(open) = stack.last() {
            return Err(Error::Markup(format!(
                "unclosed element `<{}>`",
                open.tag().unwrap_or_default()
            )));
        }
        Ok(roots)
    }

    /// Parse `<tag attr attr="v" ...>`; returns the element and whether it
    /// is already closed (void tag or `/>`).
    fn open_tag(&mut self) -> Result<(Node, bool)> {
        self.bump(1); // consume '<'
        let tag = self.name();
        if tag.is_empty() {
            return Err(Error::Markup(format!(
                "expected tag name at byte {}",
                self.pos
            )));
        }
        let node = Node::element(&tag);

        loop {
            self.skip_whitespace();
            if self.rest().starts_with("/>") {
                self.bump(2);
                return Ok((node, true));
            }
            if self.rest().starts_with('>') {
                self.bump(1);
                return Ok((node, VOID_TAGS.contains(&tag.as_str())));
            }
            if self.eof() {
                return Err(Error::Markup(format!("unterminated `<{tag}>`")));
            }

            let name = self.name();
            if name.is_empty() {
                return Err(Error::Markup(format!(
                    "bad attribute in `<{tag}>` at byte {}",
                    self.pos
                )));
            }
            let value = if self.rest().starts_with('=') {
                self.bump(1);
                self.attr_value()?
            } else {
                // Bare attribute, e.g. a ref marker.
                String::new()
            };
            node.set_attribute(&name, &value);
        }
    }

    fn close_tag(&mut self) -> Result<String> {
        self.bump(2); // consume '</'
        let tag = self.name();
        self.skip_whitespace();
        if !self.rest().starts_with('>') {
            return Err(Error::Markup(format!("malformed `</{tag}`")));
        }
        self.bump(1);
        Ok(tag)
    }

    /// Tag or attribute name: alphanumerics plus `-`, `_`, `:`.
    fn name(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.rest().chars().next() {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ':' {
                self.bump(c.len_utf8());
            } else {
                break;
            }
        }
        self.src[start..self.pos].to_string()
    }

    fn attr_value(&mut self) -> Result<String> {
        let rest = self.rest();
        if let Some(quote) = rest.chars().next().filter(|c| *c == '"' || *c == '\'') {
            let body = &rest[1..];
            match body.find(quote) {
                Some(end) => {
                    let value = body[..end].to_string();
                    self.bump(1 + end + 1);
                    Ok(value)
                }
                None => Err(Error::Markup("unterminated attribute value".into())),
            }
        } else {
            let end = rest
                .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
                .unwrap_or(rest.len());
            let value = rest[..end].to_string();
            self.bump(end);
            Ok(value)
        }
    }
}

fn attach(roots: &mut Vec<Node>, stack: &[Node], node: &Node) {
    match stack.last() {
        Some(parent) => parent.append(node),
        None => roots.push(node.clone()),
    }
}

// =============================================================================
// Tests
// =============================================================================
