//! Block lifecycle - construction, mount, unmount - and the `render` entry
//! point.
//!
//! A block is one mounted instance of a builder's output. The state machine:
//!
//! ```text
//! constructing (builder runs, refs/effects register)
//!   -> mounting  (template cloned, inserted, refs resolved, effects run)
//!   -> mounted
//!   -> unmounted (terminal - build a fresh block instead of re-mounting)
//! ```
//!
//! Mount order: parse + validate the controller's template, clone an
//! instance, insert it immediately before the mount anchor, remove the
//! anchor, resolve refs in registration order, run deferred effects in
//! registration order (collecting disposers). Unmount order: remove the
//! root, unmount refs in registration order (nested blocks, lists and
//! toggles cascade depth-first), run disposers.
//!
//! A builder may return bare markup (`String` or `&'static str` - the
//! markup is then its own controller) or any [`Controller`] value carrying a
//! `template()`.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::context::{Context, Runtime};
use crate::dom::Node;
use crate::error::{Error, Result};
use crate::refs::{marker_attribute, resolve_refs, AnyRef, RefCore};
use crate::template::Template;

// =============================================================================
// Controller
// =============================================================================

/// Value returned by a builder: whatever the caller wants to hold on to,
/// plus the markup template the block renders.
pub trait Controller: 'static {
    fn template(&self) -> String;
}

impl Controller for String {
    fn template(&self) -> String {
        self.clone()
    }
}

impl Controller for &'static str {
    fn template(&self) -> String {
        (*self).to_string()
    }
}

// =============================================================================
// Block
// =============================================================================

/// One instance of a builder's output: context, controller, root element.
pub(crate) struct Block<C: Controller> {
    ctx: Context,
    controller: Rc<C>,
    root: RefCell<Option<Node>>,
    mounted: Cell<bool>,
}

impl<C: Controller> Block<C> {
    /// Invoke `build` with a fresh context (construction phase).
    pub(crate) fn build(
        runtime: &Runtime,
        id: String,
        build: impl FnOnce(&Context) -> C,
    ) -> Block<C> {
        let ctx = Context::new(runtime.clone(), id);
        let controller = Rc::new(build(&ctx));
        Block {
            ctx,
            controller,
            root: RefCell::new(None),
            mounted: Cell::new(false),
        }
    }

    pub(crate) fn controller(&self) -> Rc<C> {
        self.controller.clone()
    }

    pub(crate) fn is_mounted(&self) -> bool {
        self.mounted.get()
    }

    /// Root element; exists only between mount and unmount.
    pub(crate) fn root(&self) -> Result<Node> {
        self.root
            .borrow()
            .clone()
            .ok_or_else(|| Error::NotMounted(self.ctx.id().to_string()))
    }

    /// Mount in the anchor's place. The anchor must be attached; it is
    /// removed once the cloned root has been inserted beside it.
    pub(crate) fn mount_at(&self, anchor: &Node) -> Result<()> {
        if self.mounted.get() {
            return Err(Error::AlreadyMounted(self.ctx.id().to_string()));
        }
        let template = Template::parse(&self.controller.template())?;
        let parent = anchor
            .parent()
            .ok_or_else(|| Error::DetachedAnchor(self.ctx.id().to_string()))?;

        self.ctx.seal();
        let root = template.instance();
        parent.insert_before(&root, Some(anchor));
        anchor.remove();

        if let Err(error) = resolve_refs(&root, &self.ctx.refs_snapshot()) {
            // Leave no partially mounted subtree behind.
            root.remove();
            return Err(error);
        }
        *self.root.borrow_mut() = Some(root);
        self.mounted.set(true);
        self.ctx.run_effects();
        Ok(())
    }

    /// Remove the root, cascade unmount through refs, run disposers.
    /// Idempotent; the block cannot be mounted again afterwards.
    pub(crate) fn unmount(&self) {
        if !self.mounted.get() {
            return;
        }
        self.mounted.set(false);
        if let Some(root) = self.root.borrow_mut().take() {
            root.remove();
        }
        self.ctx.teardown();
    }
}

// =============================================================================
// Nested block ref
// =============================================================================

type Build<C> = Box<dyn FnOnce(&Context) -> C>;

struct BlockRefInner<C: Controller> {
    core: RefCore,
    runtime: Runtime,
    build: RefCell<Option<Build<C>>>,
    block: RefCell<Option<Block<C>>>,
}

/// Ref owning a nested block. The marked element is the anchor the nested
/// root replaces; the nested builder runs at mount time.
pub struct BlockRef<C: Controller> {
    inner: Rc<BlockRefInner<C>>,
}

impl<C: Controller> Clone for BlockRef<C> {
    fn clone(&self) -> Self {
        BlockRef {
            inner: self.inner.clone(),
        }
    }
}

impl<C: Controller> BlockRef<C> {
    pub(crate) fn new(id: String, runtime: Runtime, build: Build<C>) -> BlockRef<C> {
        BlockRef {
            inner: Rc::new(BlockRefInner {
                core: RefCore::new(id),
                runtime,
                build: RefCell::new(Some(build)),
                block: RefCell::new(None),
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

    /// The nested block's controller.
    pub fn controller(&self) -> Result<Rc<C>> {
        self.inner.core.require_mounted()?;
        self.inner
            .block
            .borrow()
            .as_ref()
            .map(|block| block.controller())
            .ok_or_else(|| Error::NotMounted(self.inner.core.id().to_string()))
    }
}

impl<C: Controller> AnyRef for BlockRef<C> {
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
        let block = Block::build(&self.inner.runtime, self.inner.core.id().to_string(), build);
        block.mount_at(node)?;
        *self.inner.block.borrow_mut() = Some(block);
        self.inner.core.finish_mount();
        Ok(())
    }

    fn unmount(&self) {
        if !self.inner.core.is_mounted() {
            return;
        }
        if let Some(block) = self.inner.block.borrow_mut().take() {
            block.unmount();
        }
        self.inner.core.finish_unmount();
    }
}

// =============================================================================
// render
// =============================================================================

/// Handle to a rendered root block.
pub struct BlockHandle<C: Controller> {
    block: Rc<Block<C>>,
}

impl<C: Controller> BlockHandle<C> {
    /// The root block's controller.
    pub fn controller(&self) -> Rc<C> {
        self.block.controller()
    }

    pub fn is_mounted(&self) -> bool {
        self.block.is_mounted()
    }

    /// The mounted root element.
    pub fn root(&self) -> Result<Node> {
        self.block.root()
    }

    /// Tear the whole tree down: removes the root, cascades through every
    /// ref, runs every disposer. Terminal.
    pub fn unmount(&self) {
        self.block.unmount();
    }
}

/// Render a builder into `container`, replacing its content. Returns a
/// handle carrying the controller.
pub fn render<C, B>(container: &Node, builder: B) -> Result<BlockHandle<C>>
where
    C: Controller,
    B: FnOnce(&Context) -> C,
{
    render_with(container, move |ctx, _data: Option<&()>| builder(ctx), None)
}

/// [`render`] with a data argument passed through to the builder.
pub fn render_with<C, D, B>(container: &Node, builder: B, data: Option<D>) -> Result<BlockHandle<C>>
where
    C: Controller,
    B: FnOnce(&Context, Option<&D>) -> C,
{
    let runtime = Runtime::new();
    let id = runtime.next_block_id();
    let block = Rc::new(Block::build(&runtime, id, move |ctx| {
        builder(ctx, data.as_ref())
    }));

    container.clear_children();
    let anchor = runtime.new_anchor();
    container.append(&anchor);
    block.mount_at(&anchor)?;

    Ok(BlockHandle { block })
}

// =============================================================================
// Tests
// =============================================================================
