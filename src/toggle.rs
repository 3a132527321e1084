//! Show/hide a nested block without destroying its state.
//!
//! Unlike a nested block ref, the marked element is never removed: it stays
//! in the tree as a permanent placeholder recording the insertion point.
//! The subtree is built exactly once, at marker resolution, in a detached
//! scratch container; showing inserts its root immediately before the
//! placeholder, hiding detaches it again. Signals, handlers and element
//! bindings inside the subtree survive any number of hide/show cycles.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::block::{Block, Controller};
use crate::context::{Context, Runtime};
use crate::dom::Node;
use crate::error::{Error, Result};
use crate::refs::{marker_attribute, AnyRef, RefCore};

type Build<C> = Box<dyn FnOnce(&Context) -> C>;

struct Mounted<C: Controller> {
    block: Block<C>,
    placeholder: Node,
    visible: Cell<bool>,
}

struct ToggleRefInner<C: Controller> {
    core: RefCore,
    runtime: Runtime,
    build: RefCell<Option<Build<C>>>,
    initial_visible: bool,
    mounted: RefCell<Option<Rc<Mounted<C>>>>,
}

/// Ref owning a toggled subtree.
pub struct ToggleRef<C: Controller> {
    inner: Rc<ToggleRefInner<C>>,
}

impl<C: Controller> Clone for ToggleRef<C> {
    fn clone(&self) -> Self {
        ToggleRef {
            inner: self.inner.clone(),
        }
    }
}

impl<C: Controller> ToggleRef<C> {
    pub(crate) fn new(
        id: String,
        runtime: Runtime,
        build: Build<C>,
        visible: bool,
    ) -> ToggleRef<C> {
        ToggleRef {
            inner: Rc::new(ToggleRefInner {
                core: RefCore::new(id),
                runtime,
                build: RefCell::new(Some(build)),
                initial_visible: visible,
                mounted: RefCell::new(None),
            }),
        }
    }

    /// Marker attribute to write inside the parent template.
    pub fn marker(&self) -> String {
        marker_attribute(self.inner.core.id())
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.core.is_mounted()
    }

    fn mounted(&self) -> Result<Rc<Mounted<C>>> {
        self.inner.core.require_mounted()?;
        self.inner
            .mounted
            .borrow()
            .clone()
            .ok_or_else(|| Error::NotMounted(self.inner.core.id().to_string()))
    }

    /// Whether the subtree is currently attached.
    pub fn visible(&self) -> Result<bool> {
        Ok(self.mounted()?.visible.get())
    }

    /// The subtree's controller; available whether visible or not.
    pub fn controller(&self) -> Result<Rc<C>> {
        Ok(self.mounted()?.block.controller())
    }

    /// Attach or detach the subtree. No-op when already in the requested
    /// state.
    pub fn set_visible(&self, visible: bool) -> Result<()> {
        let mounted = self.mounted()?;
        if mounted.visible.get() == visible {
            return Ok(());
        }
        let root = mounted.block.root()?;
        if visible {
            let parent = mounted
                .placeholder
                .parent()
                .ok_or_else(|| Error::DetachedAnchor(self.inner.core.id().to_string()))?;
            parent.insert_before(&root, Some(&mounted.placeholder));
        } else {
            root.remove();
        }
        mounted.visible.set(visible);
        Ok(())
    }

    pub fn show(&self) -> Result<()> {
        self.set_visible(true)
    }

    pub fn hide(&self) -> Result<()> {
        self.set_visible(false)
    }

    /// Flip visibility.
    pub fn toggle(&self) -> Result<()> {
        let visible = self.visible()?;
        self.set_visible(!visible)
    }
}

impl<C: Controller> AnyRef for ToggleRef<C> {
    fn id(&self) -> String {
        self.inner.core.id().to_string()
    }

    fn mount(&self, node: &Node) -> Result<()> {
        self.inner.core.begin_mount()?;
        let build = self
            .inner
            .build
            .borrow_mut()
            .take()
            .ok_or_else(|| Error::AlreadyMounted(self.inner.core.id().to_string()))?;

        // Build in a detached scratch container so the subtree exists even
        // when initially hidden.
        let block = Block::build(&self.inner.runtime, self.inner.core.id().to_string(), build);
        let scratch = Node::element("div");
        let anchor = self.inner.runtime.new_anchor();
        scratch.append(&anchor);
        block.mount_at(&anchor)?;
        let root = block.root()?;
        root.remove();

        if self.inner.initial_visible {
            let parent = node
                .parent()
                .ok_or_else(|| Error::DetachedAnchor(self.inner.core.id().to_string()))?;
            parent.insert_before(&root, Some(node));
        }

        *self.inner.mounted.borrow_mut() = Some(Rc::new(Mounted {
            block,
            placeholder: node.clone(),
            visible: Cell::new(self.inner.initial_visible),
        }));
        self.inner.core.finish_mount();
        Ok(())
    }

    fn unmount(&self) {
        if !self.inner.core.is_mounted() {
            return;
        }
        if let Some(mounted) = self.inner.mounted.borrow_mut().take() {
            mounted.block.unmount();
        }
        self.inner.core.finish_unmount();
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::render;

    fn setup(visible: bool) -> (Node, ToggleRef<&'static str>) {
        let container = Node::element("div");
        let mut toggle_ref = None;
        render(&container, |ctx| {
            let toggle = ctx.toggle(|_ctx| "<em>detail</em>", visible);
            let markup = format!(
                "<div><span>A</span><span {}></span><span>B</span></div>",
                toggle.marker()
            );
            toggle_ref = Some(toggle);
            markup
        })
        .unwrap();
        (container, toggle_ref.unwrap())
    }

    fn tags(container: &Node) -> Vec<String> {
        container.children()[0]
            .children()
            .iter()
            .filter_map(|child| child.tag())
            .collect()
    }

    #[test]
    fn test_initially_visible() {
        let (container, toggle) = setup(true);
        assert!(toggle.visible().unwrap());
        assert_eq!(container.text_content(), "AdetailB");
        assert_eq!(tags(&container), ["span", "em", "span", "span"]);
    }

    #[test]
    fn test_initially_hidden_still_builds() {
        let (container, toggle) = setup(false);
        assert!(!toggle.visible().unwrap());
        assert_eq!(container.text_content(), "AB");
        assert_eq!(
            *toggle.controller().unwrap(),
            "<em>detail</em>",
            "controller available while hidden"
        );
    }

    #[test]
    fn test_hide_then_show_restores_position() {
        let (container, toggle) = setup(true);

        toggle.hide().unwrap();
        assert_eq!(container.text_content(), "AB");

        toggle.show().unwrap();
        assert_eq!(
            tags(&container),
            ["span", "em", "span", "span"],
            "subtree returns between A and the placeholder"
        );
    }

    #[test]
    fn test_set_visible_is_idempotent() {
        let (container, toggle) = setup(true);
        toggle.show().unwrap();
        toggle.show().unwrap();
        assert_eq!(tags(&container).len(), 4, "no duplicate insertion");
        toggle.hide().unwrap();
        toggle.hide().unwrap();
        assert_eq!(container.text_content(), "AB");
    }

    #[test]
    fn test_toggle_flips() {
        let (_container, toggle) = setup(false);
        toggle.toggle().unwrap();
        assert!(toggle.visible().unwrap());
        toggle.toggle().unwrap();
        assert!(!toggle.visible().unwrap());
    }

    #[test]
    fn test_state_survives_hide_show() {
        let container = Node::element("div");
        let mut toggle_ref = None;
        render(&container, |ctx| {
            let toggle = ctx.toggle(
                |inner| {
                    let label = inner.element();
                    let label_for_effect = label.clone();
                    inner.effect(move || {
                        let _ = label_for_effect.update(
                            crate::update::ElementUpdate::new().text("ready"),
                        );
                    });
                    format!("<p {}></p>", label.marker())
                },
                true,
            );
            let markup = format!("<div><span {}></span></div>", toggle.marker());
            toggle_ref = Some(toggle);
            markup
        })
        .unwrap();

        let toggle = toggle_ref.unwrap();
        assert_eq!(container.text_content(), "ready");
        toggle.hide().unwrap();
        toggle.show().unwrap();
        assert_eq!(container.text_content(), "ready", "binding survived");
    }

    #[test]
    fn test_unresolved_toggle_errors() {
        let container = Node::element("div");
        let mut toggle_ref: Option<ToggleRef<&'static str>> = None;
        render(&container, |ctx| {
            let toggle = ctx.toggle(|_ctx| "<em>x</em>", true);
            toggle_ref = Some(toggle);
            "<div>no marker</div>"
        })
        .unwrap();

        let toggle = toggle_ref.unwrap();
        assert!(matches!(toggle.visible(), Err(Error::NotMounted(_))));
        assert!(matches!(toggle.show(), Err(Error::NotMounted(_))));
    }
}
