//! Ref registry - named live bindings resolved against rendered markup.
//!
//! A ref is a stable-identity handle created during construction and
//! resolved once at mount time. Its identity string becomes a marker
//! attribute (`data-ref-<id>`) the builder writes into the template; at
//! mount the registry finds the marked element (the root itself or one
//! descendant), strips the marker, and hands the element to the ref's
//! kind-specific initializer.
//!
//! Four kinds share one envelope ([`RefCore`]: identity, mounted flag,
//! unmount hook group) and differ only in their mount-time initializer - a
//! tagged-variant design, not a hierarchy:
//!
//! - [`ElementRef`] (here) - handle to the element itself, with
//!   `update`/`set_class`/`set_style`/`on` sub-operations.
//! - [`crate::block::BlockRef`] - owns a nested block; the marked element is
//!   the anchor the block root replaces.
//! - [`crate::toggle::ToggleRef`] - owns presence state; the marked element
//!   stays as the placeholder.
//! - [`crate::list::ListRef`] - owns a list; the marked element stays as the
//!   rightmost anchor.
//!
//! Contract: invoking a handle before mount fails with
//! [`Error::NotMounted`]; mounting twice fails with
//! [`Error::AlreadyMounted`]; unmount is idempotent. A marker missing from
//! the rendered markup is a *soft* mismatch: it is logged and the ref stays
//! unmounted while the rest of the block mounts normally.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::callbacks::{Callbacks, Subscription};
use crate::compose::{ClassSpec, OwnerId, StyleSpec};
use crate::dom::Node;
use crate::error::{Error, Result};
use crate::update::{apply_update, update_element, ElementUpdate};

// =============================================================================
// Marker convention
// =============================================================================

/// Attribute name a ref id resolves to inside markup.
pub(crate) fn marker_attribute(id: &str) -> String {
    format!("data-ref-{id}")
}

// =============================================================================
// Shared envelope
// =============================================================================

/// State shared by every ref kind: identity, mounted flag, unmount hooks.
pub(crate) struct RefCore {
    id: String,
    mounted: Cell<bool>,
    unmount_hooks: Callbacks<()>,
}

impl RefCore {
    pub(crate) fn new(id: String) -> RefCore {
        RefCore {
            id,
            mounted: Cell::new(false),
            unmount_hooks: Callbacks::new(),
        }
    }

    pub(crate) fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn is_mounted(&self) -> bool {
        self.mounted.get()
    }

    /// Gate for mount: fails on a second mount attempt.
    pub(crate) fn begin_mount(&self) -> Result<()> {
        if self.mounted.get() {
            return Err(Error::AlreadyMounted(self.id.clone()));
        }
        Ok(())
    }

    pub(crate) fn finish_mount(&self) {
        self.mounted.set(true);
    }

    /// Flip to unmounted and run the unmount hooks. Callers must have
    /// checked `is_mounted` first (unmount is idempotent at the ref level).
    pub(crate) fn finish_unmount(&self) {
        self.mounted.set(false);
        self.unmount_hooks.emit(&());
    }

    pub(crate) fn require_mounted(&self) -> Result<()> {
        if self.mounted.get() {
            Ok(())
        } else {
            Err(Error::NotMounted(self.id.clone()))
        }
    }

    /// Register a hook to run when this ref unmounts.
    pub(crate) fn on_unmount(&self, hook: impl Fn() + 'static) -> Subscription {
        self.unmount_hooks.add_fn(move |_| hook())
    }
}

// =============================================================================
// Type-erased registration
// =============================================================================

/// What the context's ordered ref sequence stores. Kind-specific behavior
/// lives behind `mount`/`unmount`.
pub(crate) trait AnyRef {
    fn id(&self) -> String;
    fn mount(&self, node: &Node) -> Result<()>;
    fn unmount(&self);
}

/// Resolve every registered ref against a freshly mounted root, in
/// registration order. Missing markers warn and leave the ref unmounted.
pub(crate) fn resolve_refs(root: &Node, refs: &[Rc<dyn AnyRef>]) -> Result<()> {
    for entry in refs {
        let attr = marker_attribute(&entry.id());
        match root.query_attribute(&attr) {
            Some(node) => {
                node.remove_attribute(&attr);
                entry.mount(&node)?;
            }
            None => {
                tracing::warn!(
                    ref_id = %entry.id(),
                    "ref marker not found in rendered markup, ref left unmounted"
                );
            }
        }
    }
    Ok(())
}

// =============================================================================
// Element ref
// =============================================================================

struct ElementRefInner {
    core: RefCore,
    owner: OwnerId,
    node: RefCell<Option<Node>>,
}

/// Ref to a plain element. The default initializer: the handle resolves to
/// the marked element itself.
#[derive(Clone)]
pub struct ElementRef {
    inner: Rc<ElementRefInner>,
}

impl ElementRef {
    pub(crate) fn new(id: String, owner: OwnerId) -> ElementRef {
        ElementRef {
            inner: Rc::new(ElementRefInner {
                core: RefCore::new(id),
                owner,
                node: RefCell::new(None),
            }),
        }
    }

    /// Marker attribute to write inside the template, e.g.
    /// `<span data-ref-b0-0>`.
    pub fn marker(&self) -> String {
        marker_attribute(self.inner.core.id())
    }

    /// True once the marker has been resolved.
    pub fn is_mounted(&self) -> bool {
        self.inner.core.is_mounted()
    }

    /// The resolved element.
    pub fn get(&self) -> Result<Node> {
        self.inner.core.require_mounted()?;
        self.inner
            .node
            .borrow()
            .clone()
            .ok_or_else(|| Error::NotMounted(self.inner.core.id().to_string()))
    }

    /// Merge a sparse update into the element (base-owner class/style).
    pub fn update(&self, update: ElementUpdate) -> Result<()> {
        update_element(&self.get()?, update)
    }

    /// Merge a sparse update contributing class/style under this ref's own
    /// owner token.
    pub fn update_owned(&self, update: ElementUpdate) -> Result<()> {
        apply_update(&self.get()?, self.inner.owner, update)
    }

    /// Set this writer's class contribution.
    pub fn set_class(&self, spec: impl Into<ClassSpec>) -> Result<()> {
        self.get()?.set_class_layer(self.inner.owner, spec.into());
        Ok(())
    }

    /// Set this writer's style contribution.
    pub fn set_style(&self, spec: impl Into<StyleSpec>) -> Result<()> {
        self.get()?.set_style_layer(self.inner.owner, spec.into());
        Ok(())
    }

    /// Install or replace an event handler on the element.
    pub fn on(&self, event: &str, handler: impl Fn(&Node) + 'static) -> Result<()> {
        self.get()?.set_handler(event, Rc::new(handler));
        Ok(())
    }

    /// Register a hook to run when this ref's binding is torn down.
    pub fn on_unmount(&self, hook: impl Fn() + 'static) -> Subscription {
        self.inner.core.on_unmount(hook)
    }
}

impl AnyRef for ElementRef {
    fn id(&self) -> String {
        self.inner.core.id().to_string()
    }

    fn mount(&self, node: &Node) -> Result<()> {
        self.inner.core.begin_mount()?;
        *self.inner.node.borrow_mut() = Some(node.clone());
        self.inner.core.finish_mount();
        Ok(())
    }

    fn unmount(&self) {
        if !self.inner.core.is_mounted() {
            return;
        }
        // Prune this writer's composition layers; the base layer stays with
        // the element.
        if let Some(node) = self.inner.node.borrow_mut().take() {
            node.remove_class_layer(self.inner.owner);
            node.remove_style_layer(self.inner.owner);
        }
        self.inner.core.finish_unmount();
    }
}

// =============================================================================
// Tests
// =============================================================================
