//! Host document tree.
//!
//! The binding runtime consumes the host tree at a narrow interface: node
//! creation from markup, cloning, insertion before a reference node,
//! removal, attribute and property mutation, text/markup content assignment,
//! and descendant lookup by attribute presence. This module is that
//! interface, backed by an in-memory reference host so the runtime is fully
//! testable without a browser.
//!
//! [`Node`] is a cheap `Rc` handle; clones alias the same node. Identity
//! comparisons go through [`Node::same`] (pointer equality), which is also
//! what `PartialEq` does.
//!
//! Two pieces of state beyond the plain tree live on each element:
//!
//! - **Properties** ([`PropValue`]) and event handlers, assigned directly
//!   like DOM properties; [`Node::emit`] dispatches a handler for tests and
//!   demos.
//! - **Class/style layer maps** (see [`crate::compose`]): the hidden
//!   per-owner composition map. A template-authored `class`/`style`
//!   attribute seeds the base layer the first time any writer contributes,
//!   so static markup and reactive writers compose instead of clobbering.

pub(crate) mod markup;

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::compose::{ClassLayers, ClassSpec, OwnerId, StyleLayers, StyleSpec};
use crate::error::Result;

// =============================================================================
// Node
// =============================================================================

/// Event handler property. Handlers receive the node they are installed on.
pub type EventHandler = Rc<dyn Fn(&Node)>;

/// A directly-assigned node property (as opposed to an attribute).
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    Str(String),
    Bool(bool),
    Num(f64),
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Str(value.to_string())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Str(value)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Num(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        PropValue::Num(value as f64)
    }
}

enum NodeKind {
    Element { tag: String },
    Text { content: RefCell<String> },
}

struct NodeData {
    kind: NodeKind,
    attrs: RefCell<Vec<(String, String)>>,
    props: RefCell<HashMap<String, PropValue>>,
    handlers: RefCell<HashMap<String, EventHandler>>,
    class_layers: RefCell<ClassLayers>,
    style_layers: RefCell<StyleLayers>,
    parent: RefCell<Weak<NodeData>>,
    children: RefCell<Vec<Node>>,
}

/// Handle to one node of the host tree.
#[derive(Clone)]
pub struct Node {
    data: Rc<NodeData>,
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.to_markup())
    }
}

impl Node {
    fn from_kind(kind: NodeKind) -> Node {
        Node {
            data: Rc::new(NodeData {
                kind,
                attrs: RefCell::new(Vec::new()),
                props: RefCell::new(HashMap::new()),
                handlers: RefCell::new(HashMap::new()),
                class_layers: RefCell::new(ClassLayers::default()),
                style_layers: RefCell::new(StyleLayers::default()),
                parent: RefCell::new(Weak::new()),
                children: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Create a detached element.
    pub fn element(tag: &str) -> Node {
        Node::from_kind(NodeKind::Element {
            tag: tag.to_string(),
        })
    }

    /// Create a detached text node.
    pub fn text(content: &str) -> Node {
        Node::from_kind(NodeKind::Text {
            content: RefCell::new(content.to_string()),
        })
    }

    /// Pointer identity.
    pub fn same(&self, other: &Node) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }

    pub fn is_element(&self) -> bool {
        matches!(self.data.kind, NodeKind::Element { .. })
    }

    pub fn is_text(&self) -> bool {
        matches!(self.data.kind, NodeKind::Text { .. })
    }

    /// Element tag name, `None` for text nodes.
    pub fn tag(&self) -> Option<String> {
        match &self.data.kind {
            NodeKind::Element { tag } => Some(tag.clone()),
            NodeKind::Text { .. } => None,
        }
    }

    // =========================================================================
    // Attributes and properties
    // =========================================================================

    pub fn set_attribute(&self, name: &str, value: &str) {
        let mut attrs = self.data.attrs.borrow_mut();
        match attrs.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value.to_string(),
            None => attrs.push((name.to_string(), value.to_string())),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.data
            .attrs
            .borrow()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.data.attrs.borrow().iter().any(|(n, _)| n == name)
    }

    pub fn remove_attribute(&self, name: &str) {
        self.data.attrs.borrow_mut().retain(|(n, _)| n != name);
    }

    /// Assign a property directly (the DOM `el.prop = value` path).
    pub fn set_property(&self, name: &str, value: PropValue) {
        self.data
            .props
            .borrow_mut()
            .insert(name.to_string(), value);
    }

    pub fn property(&self, name: &str) -> Option<PropValue> {
        self.data.props.borrow().get(name).cloned()
    }

    /// Install or replace an event handler property.
    pub fn set_handler(&self, event: &str, handler: EventHandler) {
        self.data
            .handlers
            .borrow_mut()
            .insert(event.to_string(), handler);
    }

    /// Dispatch `event` to the installed handler, if any.
    pub fn emit(&self, event: &str) {
        let handler = self.data.handlers.borrow().get(event).cloned();
        if let Some(handler) = handler {
            handler(self);
        }
    }

    // =========================================================================
    // Tree structure
    // =========================================================================

    pub fn parent(&self) -> Option<Node> {
        self.data.parent.borrow().upgrade().map(|data| Node { data })
    }

    pub fn children(&self) -> Vec<Node> {
        self.data.children.borrow().clone()
    }

    pub fn next_sibling(&self) -> Option<Node> {
        let parent = self.parent()?;
        let children = parent.data.children.borrow();
        let index = children.iter().position(|child| child.same(self))?;
        children.get(index + 1).cloned()
    }

    /// Append `child` as the last child of `self`, detaching it from any
    /// current parent first.
    pub fn append(&self, child: &Node) {
        self.insert_before(child, None);
    }

    /// Insert `node` immediately before `reference` (or append when
    /// `reference` is `None` or not a child). Detaches `node` from its
    /// current parent first, so this doubles as the move operation.
    pub fn insert_before(&self, node: &Node, reference: Option<&Node>) {
        node.remove();
        let mut children = self.data.children.borrow_mut();
        let index = match reference {
            Some(reference) => children
                .iter()
                .position(|child| child.same(reference))
                .unwrap_or(children.len()),
            None => children.len(),
        };
        children.insert(index, node.clone());
        *node.data.parent.borrow_mut() = Rc::downgrade(&self.data);
    }

    /// Detach `self` from its parent. No-op when already detached.
    pub fn remove(&self) {
        if let Some(parent) = self.parent() {
            parent
                .data
                .children
                .borrow_mut()
                .retain(|child| !child.same(self));
        }
        *self.data.parent.borrow_mut() = Weak::new();
    }

    /// Remove all children.
    pub fn clear_children(&self) {
        let children = std::mem::take(&mut *self.data.children.borrow_mut());
        for child in children {
            *child.data.parent.borrow_mut() = Weak::new();
        }
    }

    // =========================================================================
    // Content
    // =========================================================================

    /// Replace content with a single text node (or rewrite a text node's
    /// content in place).
    pub fn set_text(&self, text: &str) {
        match &self.data.kind {
            NodeKind::Text { content } => *content.borrow_mut() = text.to_string(),
            NodeKind::Element { .. } => {
                self.clear_children();
                self.append(&Node::text(text));
            }
        }
    }

    /// Concatenated text of this node and all descendants.
    pub fn text_content(&self) -> String {
        match &self.data.kind {
            NodeKind::Text { content } => content.borrow().clone(),
            NodeKind::Element { .. } => self
                .children()
                .iter()
                .map(|child| child.text_content())
                .collect(),
        }
    }

    /// Replace children with parsed markup (multiple roots allowed here).
    pub fn set_html(&self, markup: &str) -> Result<()> {
        let nodes = markup::parse_fragment(markup)?;
        self.clear_children();
        for node in nodes {
            self.append(&node);
        }
        Ok(())
    }

    /// Recursive copy of tag, attributes, text and children. Properties,
    /// handlers and composition layers are instance state and are not
    /// copied.
    pub fn deep_clone(&self) -> Node {
        match &self.data.kind {
            NodeKind::Text { content } => Node::text(&content.borrow()),
            NodeKind::Element { tag } => {
                let clone = Node::element(tag);
                *clone.data.attrs.borrow_mut() = self.data.attrs.borrow().clone();
                for child in self.children() {
                    clone.append(&child.deep_clone());
                }
                clone
            }
        }
    }

    /// First element (self included, depth-first) bearing `name` as an
    /// attribute.
    pub fn query_attribute(&self, name: &str) -> Option<Node> {
        if self.is_element() && self.has_attribute(name) {
            return Some(self.clone());
        }
        for child in self.children() {
            if let Some(found) = child.query_attribute(name) {
                return Some(found);
            }
        }
        None
    }

    /// Serialize back to markup (diagnostics and tests).
    pub fn to_markup(&self) -> String {
        match &self.data.kind {
            NodeKind::Text { content } => content.borrow().clone(),
            NodeKind::Element { tag } => {
                let attrs: String = self
                    .data
                    .attrs
                    .borrow()
                    .iter()
                    .map(|(name, value)| format!(" {name}=\"{value}\""))
                    .collect();
                let children: String = self
                    .children()
                    .iter()
                    .map(|child| child.to_markup())
                    .collect();
                format!("<{tag}{attrs}>{children}</{tag}>")
            }
        }
    }

    // =========================================================================
    // Class/style composition layers
    // =========================================================================

    /// Set `owner`'s class contribution and recompose the `class` attribute.
    pub fn set_class_layer(&self, owner: OwnerId, spec: ClassSpec) {
        self.seed_class_layer();
        let composed = {
            let mut layers = self.data.class_layers.borrow_mut();
            layers.set(owner, spec);
            layers.compose()
        };
        self.set_attribute("class", &composed);
    }

    /// Drop `owner`'s class contribution and recompose.
    pub fn remove_class_layer(&self, owner: OwnerId) {
        let composed = {
            let mut layers = self.data.class_layers.borrow_mut();
            layers.remove(owner);
            if layers.is_empty() {
                None
            } else {
                Some(layers.compose())
            }
        };
        match composed {
            Some(composed) => self.set_attribute("class", &composed),
            None => self.remove_attribute("class"),
        }
    }

    /// Set `owner`'s style contribution and recompose the `style` attribute.
    pub fn set_style_layer(&self, owner: OwnerId, spec: StyleSpec) {
        self.seed_style_layer();
        let composed = {
            let mut layers = self.data.style_layers.borrow_mut();
            layers.set(owner, spec);
            layers.compose()
        };
        self.set_attribute("style", &composed);
    }

    /// Drop `owner`'s style contribution and recompose.
    pub fn remove_style_layer(&self, owner: OwnerId) {
        let composed = {
            let mut layers = self.data.style_layers.borrow_mut();
            layers.remove(owner);
            if layers.is_empty() {
                None
            } else {
                Some(layers.compose())
            }
        };
        match composed {
            Some(composed) => self.set_attribute("style", &composed),
            None => self.remove_attribute("style"),
        }
    }

    // A template-authored attribute becomes the base layer the first time
    // any writer contributes.
    fn seed_class_layer(&self) {
        let mut layers = self.data.class_layers.borrow_mut();
        if layers.is_empty() {
            if let Some(existing) = self.attribute("class") {
                if !existing.is_empty() {
                    layers.set(OwnerId::BASE, ClassSpec::Names(existing));
                }
            }
        }
    }

    fn seed_style_layer(&self) {
        let mut layers = self.data.style_layers.borrow_mut();
        if layers.is_empty() {
            if let Some(existing) = self.attribute("style") {
                if !existing.is_empty() {
                    layers.set(OwnerId::BASE, StyleSpec::Css(existing));
                }
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
