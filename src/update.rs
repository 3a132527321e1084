//! Sparse element updates.
//!
//! [`ElementUpdate`] is a sparse record merged into a live element: only the
//! fields you mention change, everything else is untouched. Recognized
//! fields mirror the host element surface - text content, inner markup,
//! direct properties, attributes, event handlers, and the composed
//! `class`/`style` layers (see [`crate::compose`]).
//!
//! # Example
//!
//! ```ignore
//! use refdom::update::{update_element, ElementUpdate};
//!
//! update_element(&node, ElementUpdate::new()
//!     .text("3 items")
//!     .attr("title", "cart")
//!     .class("cart cart--full")
//!     .on("click", |_| println!("clicked")))?;
//! ```

use std::rc::Rc;

use crate::compose::{ClassSpec, OwnerId, StyleSpec};
use crate::dom::{EventHandler, Node, PropValue};
use crate::error::Result;

// =============================================================================
// Update record
// =============================================================================

/// Sparse update applied to a live element. Build with the chained setters;
/// unset fields are left alone (merge, not replacement).
#[derive(Default)]
pub struct ElementUpdate {
    text: Option<String>,
    html: Option<String>,
    props: Vec<(String, PropValue)>,
    attrs: Vec<(String, String)>,
    handlers: Vec<(String, EventHandler)>,
    class: Option<ClassSpec>,
    style: Option<StyleSpec>,
}

impl ElementUpdate {
    pub fn new() -> Self {
        ElementUpdate::default()
    }

    /// Replace the element's text content.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Replace the element's children with parsed markup.
    pub fn html(mut self, markup: impl Into<String>) -> Self {
        self.html = Some(markup.into());
        self
    }

    /// Assign a property directly.
    pub fn prop(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.props.push((name.into(), value.into()));
        self
    }

    /// Set an attribute via the attribute API.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    /// Install or replace an event handler.
    pub fn on(mut self, event: impl Into<String>, handler: impl Fn(&Node) + 'static) -> Self {
        self.handlers.push((event.into(), Rc::new(handler)));
        self
    }

    /// Contribute to the composed class list.
    pub fn class(mut self, spec: impl Into<ClassSpec>) -> Self {
        self.class = Some(spec.into());
        self
    }

    /// Contribute to the composed style.
    pub fn style(mut self, spec: impl Into<StyleSpec>) -> Self {
        self.style = Some(spec.into());
        self
    }
}

// =============================================================================
// Application
// =============================================================================

/// Merge `update` into `element` as the element's own base writer
/// ([`OwnerId::BASE`]). Ref writers use their own owner token via
/// [`crate::refs::ElementRef::set_class`] / `set_style`, so both coexist.
pub fn update_element(element: &Node, update: ElementUpdate) -> Result<()> {
    apply_update(element, OwnerId::BASE, update)
}

pub(crate) fn apply_update(element: &Node, owner: OwnerId, update: ElementUpdate) -> Result<()> {
    if let Some(text) = update.text {
        element.set_text(&text);
    }
    if let Some(html) = update.html {
        element.set_html(&html)?;
    }
    for (name, value) in update.props {
        element.set_property(&name, value);
    }
    for (name, value) in update.attrs {
        element.set_attribute(&name, &value);
    }
    for (event, handler) in update.handlers {
        element.set_handler(&event, handler);
    }
    if let Some(class) = update.class {
        element.set_class_layer(owner, class);
    }
    if let Some(style) = update.style {
        element.set_style_layer(owner, style);
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
