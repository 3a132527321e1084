//! Context - per-block registration surface.
//!
//! One context exists per block instance. While the builder runs
//! ("construction"), refs and deferred effects may be registered; the moment
//! mounting begins the context is sealed and any further registration is an
//! authoring bug. Refs resolve and effects run in registration order.
//!
//! Identity: a context id derives from its parent's id plus the positional
//! index of the ref that owns it (`b1`, `b1-0`, `b1-0-2`, ...). Synthetic
//! ids for dynamically created anchors come from the per-render [`Runtime`]
//! counter, so independent render roots never share id space.
//!
//! # Example
//!
//! ```ignore
//! let handle = refdom::render(&container, |ctx| {
//!     let title = ctx.element();
//!     let count = refdom::signal(0);
//!
//!     let title_for_effect = title.clone();
//!     let count_for_effect = count.clone();
//!     ctx.effect(move || {
//!         // Subscription is returned as the disposer: the binding dies
//!         // with the block.
//!         count_for_effect.on(move |value| {
//!             let _ = title_for_effect.update(
//!                 refdom::ElementUpdate::new().text(format!("{value} clicks")),
//!             );
//!         })
//!     });
//!
//!     refdom::markup!("<h1 {}></h1>", title.marker())
//! })?;
//! ```
//!
//! # Panics
//!
//! All registration methods panic when called after mounting has begun
//! (sealed context). That is the fail-fast "registered too late" condition:
//! it indicates a builder holding on to its context past construction.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::block::{BlockRef, Controller};
use crate::callbacks::Subscription;
use crate::compose::OwnerId;
use crate::dom::Node;
use crate::list::{ListInit, ListRef};
use crate::refs::{AnyRef, ElementRef};
use crate::toggle::ToggleRef;

// =============================================================================
// Runtime - per-render id counter
// =============================================================================

/// Shared counter threaded through one `render` call tree. Issues block ids,
/// anchor ids and style-writer owner tokens. Explicitly per-instance: there
/// is no process-global state.
#[derive(Clone)]
pub(crate) struct Runtime {
    counter: Rc<Cell<u64>>,
}

impl Runtime {
    pub(crate) fn new() -> Runtime {
        // 0 is reserved for OwnerId::BASE.
        Runtime {
            counter: Rc::new(Cell::new(0)),
        }
    }

    fn bump(&self) -> u64 {
        let next = self.counter.get() + 1;
        self.counter.set(next);
        next
    }

    pub(crate) fn next_block_id(&self) -> String {
        format!("b{}", self.bump())
    }

    pub(crate) fn next_owner(&self) -> OwnerId {
        OwnerId::new(self.bump())
    }

    /// Detachable anchor element carrying a synthetic placeholder id.
    pub(crate) fn new_anchor(&self) -> Node {
        let anchor = Node::element("span");
        anchor.set_attribute("data-ref", &format!("b{}", self.bump()));
        anchor
    }
}

// =============================================================================
// Disposers
// =============================================================================

/// Cleanup function collected from effects, run at unmount.
pub type Disposer = Box<dyn FnOnce()>;

/// Wrap a closure as a [`Disposer`] (helps effect return-type inference).
pub fn disposer(f: impl FnOnce() + 'static) -> Disposer {
    Box::new(f)
}

/// Conversion for effect return values: effects may return nothing, a
/// [`Disposer`], an optional disposer, or a [`Subscription`] (which is then
/// unsubscribed at unmount).
pub trait IntoDisposer {
    fn into_disposer(self) -> Option<Disposer>;
}

impl IntoDisposer for () {
    fn into_disposer(self) -> Option<Disposer> {
        None
    }
}

impl IntoDisposer for Disposer {
    fn into_disposer(self) -> Option<Disposer> {
        Some(self)
    }
}

impl IntoDisposer for Option<Disposer> {
    fn into_disposer(self) -> Option<Disposer> {
        self
    }
}

impl IntoDisposer for Subscription {
    fn into_disposer(self) -> Option<Disposer> {
        Some(Box::new(move || self.unsubscribe()))
    }
}

// =============================================================================
// Context
// =============================================================================

type Effect = Box<dyn FnOnce() -> Option<Disposer>>;

struct ContextInner {
    id: String,
    runtime: Runtime,
    sealed: Cell<bool>,
    refs: RefCell<Vec<Rc<dyn AnyRef>>>,
    effects: RefCell<Vec<Effect>>,
    disposers: RefCell<Vec<Disposer>>,
}

/// Registration surface handed to a builder. Cheap to clone; clones share
/// the same block instance.
#[derive(Clone)]
pub struct Context {
    inner: Rc<ContextInner>,
}

impl Context {
    pub(crate) fn new(runtime: Runtime, id: String) -> Context {
        Context {
            inner: Rc::new(ContextInner {
                id,
                runtime,
                sealed: Cell::new(false),
                refs: RefCell::new(Vec::new()),
                effects: RefCell::new(Vec::new()),
                disposers: RefCell::new(Vec::new()),
            }),
        }
    }

    /// This block instance's identity string.
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    fn assert_open(&self, what: &str) {
        assert!(
            !self.inner.sealed.get(),
            "context `{}`: {} registered after mounting began; declare everything during construction",
            self.inner.id,
            what
        );
    }

    fn next_ref_id(&self) -> String {
        format!("{}-{}", self.inner.id, self.inner.refs.borrow().len())
    }

    fn register(&self, entry: Rc<dyn AnyRef>) {
        self.inner.refs.borrow_mut().push(entry);
    }

    // =========================================================================
    // Ref registration
    // =========================================================================

    /// Register a plain element ref.
    pub fn element(&self) -> ElementRef {
        self.assert_open("element ref");
        let r = ElementRef::new(self.next_ref_id(), self.inner.runtime.next_owner());
        self.register(Rc::new(r.clone()));
        r
    }

    /// Register a nested block. The builder runs when this block's marker
    /// resolves; the marked element is the anchor the nested root replaces.
    pub fn block<C, D, B>(&self, builder: B, data: Option<D>) -> BlockRef<C>
    where
        C: Controller,
        D: 'static,
        B: FnOnce(&Context, Option<&D>) -> C + 'static,
    {
        self.assert_open("block ref");
        let id = self.next_ref_id();
        let build: Box<dyn FnOnce(&Context) -> C> =
            Box::new(move |ctx| builder(ctx, data.as_ref()));
        let r = BlockRef::new(id, self.inner.runtime.clone(), build);
        self.register(Rc::new(r.clone()));
        r
    }

    /// Register a toggled subtree. The marked element stays in the tree as
    /// the placeholder; `visible` is applied once, at mount time.
    pub fn toggle<C, B>(&self, builder: B, visible: bool) -> ToggleRef<C>
    where
        C: Controller,
        B: FnOnce(&Context) -> C + 'static,
    {
        self.assert_open("toggle ref");
        let id = self.next_ref_id();
        let r = ToggleRef::new(id, self.inner.runtime.clone(), Box::new(builder), visible);
        self.register(Rc::new(r.clone()));
        r
    }

    /// Register a repeated-block list. The marked element stays in the tree
    /// as the rightmost anchor. Initial population is realized as a deferred
    /// effect: items are pushed once the owning block has begun mounting.
    pub fn list<C, D, B>(&self, builder: B, init: ListInit<D>) -> ListRef<C, D>
    where
        C: Controller,
        D: 'static,
        B: Fn(&Context, Option<&D>) -> C + 'static,
    {
        self.assert_open("list ref");
        let id = self.next_ref_id();
        let r = ListRef::new(id, self.inner.runtime.clone(), Rc::new(builder));
        self.register(Rc::new(r.clone()));

        if !matches!(init, ListInit::Empty) {
            let list = r.clone();
            self.effect(move || populate(&list, init));
        }
        r
    }

    // =========================================================================
    // Effects and unmount hooks
    // =========================================================================

    /// Register a deferred effect. Effects run after all refs resolve, in
    /// registration order; a returned disposer joins the unmount set.
    pub fn effect<F, R>(&self, f: F)
    where
        F: FnOnce() -> R + 'static,
        R: IntoDisposer,
    {
        self.assert_open("effect");
        self.inner
            .effects
            .borrow_mut()
            .push(Box::new(move || f().into_disposer()));
    }

    /// Register a callback to run when this block unmounts.
    pub fn on_unmount(&self, f: impl FnOnce() + 'static) {
        self.assert_open("unmount callback");
        self.inner.disposers.borrow_mut().push(Box::new(f));
    }

    // =========================================================================
    // Lifecycle plumbing (driven by Block)
    // =========================================================================

    /// Freeze registration; called when mounting begins.
    pub(crate) fn seal(&self) {
        self.inner.sealed.set(true);
    }

    pub(crate) fn refs_snapshot(&self) -> Vec<Rc<dyn AnyRef>> {
        self.inner.refs.borrow().clone()
    }

    /// Run deferred effects in registration order, collecting disposers.
    pub(crate) fn run_effects(&self) {
        let effects = std::mem::take(&mut *self.inner.effects.borrow_mut());
        for effect in effects {
            if let Some(disposer) = effect() {
                self.inner.disposers.borrow_mut().push(disposer);
            }
        }
    }

    /// Unmount refs in registration order, then run disposers exactly once.
    pub(crate) fn teardown(&self) {
        let refs = self.refs_snapshot();
        for entry in refs {
            entry.unmount();
        }
        let disposers = std::mem::take(&mut *self.inner.disposers.borrow_mut());
        for disposer in disposers {
            disposer();
        }
    }
}

fn populate<C, D>(list: &ListRef<C, D>, init: ListInit<D>)
where
    C: Controller,
    D: 'static,
{
    let outcome = match init {
        ListInit::Empty => Ok(()),
        ListInit::Count(count) => (0..count).try_for_each(|_| list.push(None::<D>).map(|_| ())),
        ListInit::Items(items) => items
            .into_iter()
            .try_for_each(|item| list.push(item).map(|_| ())),
    };
    if let Err(error) = outcome {
        // The list's marker was missing from the markup; nothing to fill.
        tracing::warn!(%error, "skipping initial list population");
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::signal;
    use std::cell::RefCell;

    fn context(id: &str) -> Context {
        Context::new(Runtime::new(), id.to_string())
    }

    #[test]
    fn test_ref_ids_derive_from_context_and_position() {
        let ctx = context("b1");
        let first = ctx.element();
        let second = ctx.element();
        assert_eq!(first.marker(), "data-ref-b1-0");
        assert_eq!(second.marker(), "data-ref-b1-1");
    }

    #[test]
    #[should_panic(expected = "after mounting began")]
    fn test_effect_after_seal_panics() {
        let ctx = context("b1");
        ctx.seal();
        ctx.effect(|| ());
    }

    #[test]
    #[should_panic(expected = "after mounting began")]
    fn test_ref_after_seal_panics() {
        let ctx = context("b1");
        ctx.seal();
        let _ = ctx.element();
    }

    #[test]
    fn test_effects_run_in_order_and_collect_disposers() {
        let ctx = context("b1");
        let log = Rc::new(RefCell::new(Vec::new()));

        for label in ["one", "two"] {
            let log = log.clone();
            ctx.effect(move || {
                log.borrow_mut().push(format!("effect-{label}"));
                let log = log.clone();
                disposer(move || log.borrow_mut().push(format!("dispose-{label}")))
            });
        }

        ctx.seal();
        ctx.run_effects();
        ctx.teardown();

        assert_eq!(
            *log.borrow(),
            vec!["effect-one", "effect-two", "dispose-one", "dispose-two"]
        );
    }

    #[test]
    fn test_disposers_run_exactly_once() {
        let ctx = context("b1");
        let runs = Rc::new(Cell::new(0));

        let runs_clone = runs.clone();
        ctx.on_unmount(move || runs_clone.set(runs_clone.get() + 1));

        ctx.seal();
        ctx.teardown();
        ctx.teardown();
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn test_effect_subscription_is_disposed_at_teardown() {
        let ctx = context("b1");
        let count = signal(0);

        let count_for_effect = count.clone();
        ctx.effect(move || count_for_effect.on(|_| {}));

        ctx.seal();
        ctx.run_effects();
        assert_eq!(count.watcher_count(), 1);

        ctx.teardown();
        assert_eq!(
            count.watcher_count(),
            0,
            "subscription returned from an effect must die with the block"
        );
    }

    #[test]
    fn test_runtime_ids_are_per_instance() {
        let first = Runtime::new();
        let second = Runtime::new();
        assert_eq!(first.next_block_id(), "b1");
        assert_eq!(first.next_block_id(), "b2");
        assert_eq!(
            second.next_block_id(),
            "b1",
            "independent runtimes do not share a counter"
        );
    }
}
